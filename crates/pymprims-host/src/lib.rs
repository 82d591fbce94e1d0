//! Host document abstraction.
//!
//! The endpoints never touch a browser directly. Everything they need from the
//! surrounding document goes through the traits defined here:
//! - [`Host`]: listeners, timers, navigation, custom events
//! - [`ParentHost`]: container lookup, geometry, frame mounting and posting
//! - [`ChildHost`]: location, body height, posting to the parent, embedding
//!
//! This is the lowest layer of pymprims. The [`memory`] module provides a
//! deterministic in-memory document with a manual clock.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{HostError, Result};
pub use memory::{EmbeddingMode, MemoryFrame, MemoryPage, Posted};
pub use traits::{
    ChildHost, EventKind, FrameSpec, FrameState, Host, HostEvent, InboundMessage, ListenerId,
    MessageData, ParentHost, Rect, TimerId, Viewport,
};
