/// Errors raised by host document operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    /// No element with the given id exists in the document.
    #[error("element not found: {0}")]
    ElementNotFound(String),

    /// The container holds no frame element.
    #[error("no frame in container {0}")]
    NoFrame(String),

    /// A cross-origin read was blocked.
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// A browser API is unavailable in this environment.
    #[error("host unavailable: {0}")]
    Unavailable(String),

    /// A browser API call threw.
    #[error("host call failed: {0}")]
    Call(String),
}

pub type Result<T> = std::result::Result<T, HostError>;
