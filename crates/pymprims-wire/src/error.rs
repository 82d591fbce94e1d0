/// Errors that can occur while building wire messages.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    /// The channel id is empty.
    #[error("channel id must not be empty")]
    EmptyChannelId,

    /// The channel id contains or overlaps the message delimiter.
    #[error("channel id {0:?} collides with the message delimiter")]
    DelimiterInChannelId(String),

    /// The message type is empty, has whitespace, or collides with the delimiter.
    #[error("invalid message type {0:?}")]
    InvalidMessageType(String),

    /// The configured origin pattern is not a valid regular expression.
    #[error("invalid origin pattern {pattern:?}: {message}")]
    InvalidOriginPattern { pattern: String, message: String },
}

pub type Result<T> = std::result::Result<T, WireError>;
