//! Responsive embedded frames over a string message protocol.
//!
//! A parent page mounts a child document in a frame and keeps the frame sized
//! to the child's content. Both sides talk over flat delimited strings scoped by
//! a channel id.
//!
//! # Crate Structure
//!
//! - [`wire`]: message framing, origin and URL guards, frame URL parameters
//! - [`host`]: the document capabilities endpoints need, plus in-memory hosts
//! - [`endpoint`]: parent and child endpoints (behind the `endpoint` feature)

/// Re-export wire types.
pub mod wire {
    pub use pymprims_wire::*;
}

/// Re-export host types.
pub mod host {
    pub use pymprims_host::*;
}

/// Re-export endpoint types (requires `endpoint` feature).
#[cfg(feature = "endpoint")]
pub mod endpoint {
    pub use pymprims_endpoint::*;
}
