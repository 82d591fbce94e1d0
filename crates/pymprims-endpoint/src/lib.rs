//! Parent and child endpoints for string-framed frame messaging.
//!
//! A [`Parent`] lives in the embedding document: it mounts a frame into a
//! container, resizes it when the child reports its height, and forwards width
//! and scroll position. A [`Child`] lives in the framed document: it reads its
//! channel id from the frame URL and reports its height.
//!
//! Endpoints are driven by host events and never block. [`Harness`] connects a
//! parent and a child over in-memory documents.

pub mod child;
pub mod config;
pub mod error;
pub mod handlers;
pub mod harness;
pub mod instances;
pub mod parent;
pub mod throttle;

pub use child::{Child, ChildSender, EMBEDDED_CLASS, MARKED_EMBEDDED_EVENT, NOT_EMBEDDED_CLASS};
pub use config::{
    ChildConfig, ChildSettings, EmbeddedStatusCallback, ParentConfig, ParentSettings,
    RenderCallback, ATTRIBUTE_PREFIX, DEFAULT_SCROLL_WAIT_MS,
};
pub use error::{EndpointError, Result};
pub use handlers::{Dispatch, Handler, HandlerTable};
pub use harness::{Direction, Exchange, Harness, HarnessConfig};
pub use instances::{InstanceRegistry, RegistryHandle, SharedParent, PYM_INITIALIZED_EVENT};
pub use parent::Parent;
pub use throttle::Throttle;
