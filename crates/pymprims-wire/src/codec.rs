use crate::error::{Result, WireError};

/// Literal tag that opens every wire message.
pub const PROTOCOL_TAG: &str = "pym";

/// Segment delimiter. Chosen to be improbable in real content.
pub const DELIMITER: &str = "xPYMx";

/// A decoded message addressed to one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// The message type, e.g. `height` or a user-defined type.
    pub message_type: String,
    /// The flat string payload.
    pub payload: String,
}

impl Message {
    /// Create a new message.
    pub fn new(message_type: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            message_type: message_type.into(),
            payload: payload.into(),
        }
    }
}

/// Encode a message into the wire format.
///
/// Wire format:
/// ```text
/// pym<DELIM><channel id><DELIM><message type><DELIM><payload ... to end>
/// ```
///
/// No validation is performed; see [`try_encode`].
pub fn encode(channel_id: &str, message_type: &str, payload: &str) -> String {
    let mut out = String::with_capacity(
        PROTOCOL_TAG.len()
            + DELIMITER.len() * 3
            + channel_id.len()
            + message_type.len()
            + payload.len(),
    );
    out.push_str(PROTOCOL_TAG);
    out.push_str(DELIMITER);
    out.push_str(channel_id);
    out.push_str(DELIMITER);
    out.push_str(message_type);
    out.push_str(DELIMITER);
    out.push_str(payload);
    out
}

/// Encode a message after checking that the structural segments decode back.
pub fn try_encode(channel_id: &str, message_type: &str, payload: &str) -> Result<String> {
    validate_channel_id(channel_id)?;
    validate_message_type(message_type)?;
    Ok(encode(channel_id, message_type, payload))
}

/// Decode a wire string addressed to `channel_id`.
///
/// Returns `None` when the string is not a protocol message, is addressed to a
/// different channel, or carries an empty or whitespace-bearing message type.
/// Everything after the third delimiter is payload, including further delimiters.
pub fn decode(wire: &str, channel_id: &str) -> Option<Message> {
    let rest = wire.strip_prefix(PROTOCOL_TAG)?;
    let rest = rest.strip_prefix(DELIMITER)?;
    let rest = rest.strip_prefix(channel_id)?;
    let rest = rest.strip_prefix(DELIMITER)?;

    let split = rest.find(DELIMITER)?;
    let message_type = &rest[..split];
    let payload = &rest[split + DELIMITER.len()..];

    if !is_valid_message_type(message_type) {
        return None;
    }

    Some(Message::new(message_type, payload))
}

/// Check that a channel id can be framed unambiguously.
pub fn validate_channel_id(channel_id: &str) -> Result<()> {
    if channel_id.is_empty() {
        return Err(WireError::EmptyChannelId);
    }
    if !delimits_cleanly(channel_id) {
        return Err(WireError::DelimiterInChannelId(channel_id.to_string()));
    }
    Ok(())
}

fn validate_message_type(message_type: &str) -> Result<()> {
    if is_valid_message_type(message_type) {
        Ok(())
    } else {
        Err(WireError::InvalidMessageType(message_type.to_string()))
    }
}

fn is_valid_message_type(message_type: &str) -> bool {
    !message_type.is_empty()
        && delimits_cleanly(message_type)
        && !message_type.chars().any(char::is_whitespace)
}

/// The first delimiter after `segment` must be the one that follows it.
///
/// Rejects segments containing the delimiter and segments ending in a prefix
/// that overlaps it (`...xPYM`).
fn delimits_cleanly(segment: &str) -> bool {
    let mut framed = String::with_capacity(segment.len() + DELIMITER.len());
    framed.push_str(segment);
    framed.push_str(DELIMITER);
    framed.find(DELIMITER) == Some(segment.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_layout() {
        assert_eq!(
            encode("example", "height", "400"),
            "pymxPYMxexamplexPYMxheightxPYMx400"
        );
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let wire = encode("graphic-1", "width", "800");
        let message = decode(&wire, "graphic-1").unwrap();
        assert_eq!(message, Message::new("width", "800"));
    }

    #[test]
    fn test_payload_keeps_embedded_delimiters() {
        let payload = "axPYMxbxPYMx";
        let wire = encode("c", "custom", payload);
        let message = decode(&wire, "c").unwrap();
        assert_eq!(message.message_type, "custom");
        assert_eq!(message.payload, payload);
    }

    #[test]
    fn test_payload_may_span_lines() {
        let wire = encode("c", "note", "line one\nline two");
        assert_eq!(decode(&wire, "c").unwrap().payload, "line one\nline two");
    }

    #[test]
    fn test_empty_payload() {
        let wire = encode("c", "parentPositionInfo", "");
        let message = decode(&wire, "c").unwrap();
        assert_eq!(message.message_type, "parentPositionInfo");
        assert!(message.payload.is_empty());
    }

    #[test]
    fn test_decode_other_channel_is_no_match() {
        let wire = encode("first", "height", "10");
        assert!(decode(&wire, "second").is_none());
    }

    #[test]
    fn test_decode_channel_prefix_is_no_match() {
        // "ab" must not match a message addressed to "abc".
        let wire = encode("abc", "height", "10");
        assert!(decode(&wire, "ab").is_none());
    }

    #[test]
    fn test_decode_requires_protocol_tag() {
        assert!(decode("xPYMxcxPYMxheightxPYMx1", "c").is_none());
        assert!(decode("pimxPYMxcxPYMxheightxPYMx1", "c").is_none());
        assert!(decode(" pymxPYMxcxPYMxheightxPYMx1", "c").is_none());
    }

    #[test]
    fn test_decode_requires_payload_delimiter() {
        assert!(decode("pymxPYMxcxPYMxheight", "c").is_none());
    }

    #[test]
    fn test_decode_rejects_bad_message_types() {
        assert!(decode("pymxPYMxcxPYMxxPYMx1", "c").is_none());
        assert!(decode("pymxPYMxcxPYMxtwo wordsxPYMx1", "c").is_none());
    }

    #[test]
    fn test_try_encode_validates_segments() {
        assert_eq!(
            try_encode("axPYMxb", "height", "1"),
            Err(WireError::DelimiterInChannelId("axPYMxb".to_string()))
        );
        assert_eq!(try_encode("", "height", "1"), Err(WireError::EmptyChannelId));
        assert!(matches!(
            try_encode("a", "bad type", "1"),
            Err(WireError::InvalidMessageType(_))
        ));
        assert!(matches!(
            try_encode("a", "xPYMx", "1"),
            Err(WireError::InvalidMessageType(_))
        ));
        assert!(matches!(
            try_encode("axPYM", "height", "1"),
            Err(WireError::DelimiterInChannelId(_))
        ));
        assert!(matches!(
            try_encode("a", "heightxPYM", "1"),
            Err(WireError::InvalidMessageType(_))
        ));
        assert!(try_encode("a", "height", "xPYMx").is_ok());
    }
}
