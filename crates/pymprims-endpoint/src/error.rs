/// Errors that can occur in endpoint operations.
///
/// Only local mistakes surface here. Anything arriving from the other document
/// is logged and dropped instead.
#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    /// Wire-level error (bad channel id or message type).
    #[error("wire error: {0}")]
    Wire(#[from] pymprims_wire::WireError),

    /// Host document error.
    #[error("host error: {0}")]
    Host(#[from] pymprims_host::HostError),

    /// The container element does not exist.
    #[error("container element not found: {0}")]
    ContainerNotFound(String),

    /// Neither the frame URL nor the configuration supplied a channel id.
    #[error("no channel id: frame URL has no childId parameter and no id was configured")]
    MissingChannelId,

    /// JSON configuration could not be parsed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EndpointError>;
