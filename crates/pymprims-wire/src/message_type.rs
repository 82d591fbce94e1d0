//! Reserved message types.
//!
//! Every other type is available for application-defined use.

/// Parent to child: container width in pixels.
pub const WIDTH: &str = "width";

/// Child to parent: document height in pixels.
pub const HEIGHT: &str = "height";

/// Either direction: navigate the receiving document to a URL.
pub const NAVIGATE_TO: &str = "navigateTo";

/// Child to parent: scroll the parent window to the frame top plus an offset.
pub const SCROLL_TO_CHILD_POS: &str = "scrollToChildPos";

/// Child to parent: request a `viewport-iframe-position` reply.
pub const PARENT_POSITION_INFO: &str = "parentPositionInfo";

/// Parent to child: `"vw vh top left bottom right"`.
pub const VIEWPORT_IFRAME_POSITION: &str = "viewport-iframe-position";

/// Returns true if the message type has built-in meaning for either endpoint.
pub fn is_reserved(message_type: &str) -> bool {
    matches!(
        message_type,
        WIDTH
            | HEIGHT
            | NAVIGATE_TO
            | SCROLL_TO_CHILD_POS
            | PARENT_POSITION_INFO
            | VIEWPORT_IFRAME_POSITION
    )
}

/// Returns true if the parent endpoint registers a built-in handler for the type.
pub fn is_parent_builtin(message_type: &str) -> bool {
    matches!(
        message_type,
        HEIGHT | NAVIGATE_TO | SCROLL_TO_CHILD_POS | PARENT_POSITION_INFO
    )
}

/// Returns true if the child endpoint registers a built-in handler for the type.
pub fn is_child_builtin(message_type: &str) -> bool {
    matches!(message_type, WIDTH | NAVIGATE_TO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_types_split_between_endpoints() {
        assert!(is_reserved(VIEWPORT_IFRAME_POSITION));
        assert!(!is_parent_builtin(VIEWPORT_IFRAME_POSITION));
        assert!(!is_child_builtin(VIEWPORT_IFRAME_POSITION));

        assert!(is_parent_builtin(HEIGHT));
        assert!(!is_child_builtin(HEIGHT));
        assert!(is_child_builtin(WIDTH));
        assert!(is_parent_builtin(NAVIGATE_TO) && is_child_builtin(NAVIGATE_TO));

        assert!(!is_reserved("custom"));
    }
}
