//! String framing for parent/child frame messaging.
//!
//! Every message crossing the embedding boundary is a single flat string:
//! - The literal protocol tag `pym`
//! - The channel id that scopes the message to one parent/child pairing
//! - The message type
//! - The payload, which runs to the end of the string
//!
//! Segments are joined with [`DELIMITER`]. Only the first three delimiters are
//! structural, so payloads may contain anything.

pub mod codec;
pub mod error;
pub mod guard;
pub mod message_type;
pub mod query;
pub mod size;

pub use codec::{decode, encode, try_encode, validate_channel_id, Message, DELIMITER, PROTOCOL_TAG};
pub use error::{Result, WireError};
pub use guard::{is_safe_message, is_safe_url, OriginPattern, WILDCARD_ORIGIN};
pub use message_type::{
    HEIGHT, NAVIGATE_TO, PARENT_POSITION_INFO, SCROLL_TO_CHILD_POS, VIEWPORT_IFRAME_POSITION,
    WIDTH,
};
pub use query::{
    build_frame_src, encode_uri_component, parameter_by_name, FrameSrc, ParentParams,
    CHILD_ID_PARAM, DEFAULT_PARENT_URL_PARAM, INITIAL_WIDTH_PARAM, PARENT_TITLE_PARAM,
};
pub use size::{format_js_number, parse_int, SizeValue};
