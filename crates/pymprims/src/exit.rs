use std::fmt;
use std::io;

use pymprims_endpoint::EndpointError;
use pymprims_wire::WireError;

// Exit codes shared by every subcommand.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    CliError::new(INTERNAL, format!("{context}: {err}"))
}

pub fn wire_error(context: &str, err: WireError) -> CliError {
    CliError::new(USAGE, format!("{context}: {err}"))
}

pub fn endpoint_error(context: &str, err: EndpointError) -> CliError {
    match err {
        EndpointError::Wire(err) => wire_error(context, err),
        EndpointError::Json(err) => CliError::new(DATA_INVALID, format!("{context}: {err}")),
        EndpointError::ContainerNotFound(_) | EndpointError::MissingChannelId => {
            CliError::new(USAGE, format!("{context}: {err}"))
        }
        EndpointError::Host(err) => CliError::new(FAILURE, format!("{context}: {err}")),
    }
}
