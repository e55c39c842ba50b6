//! Operation error kinds.

use rmcp::ErrorData as McpError;
use serde_json::json;
use thiserror::Error;

/// Errors raised by tools and resources.
///
/// Every variant is converted into an MCP protocol error before it leaves
/// the server, so clients see them as failed requests rather than
/// transport faults.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum Error {
    /// Arguments were malformed or out of range.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("cannot divide by zero")]
    DivisionByZero,

    /// A record addressed by id does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// An aggregate was requested over a collection with no rows.
    #[error("no {0} available")]
    EmptyCollection(&'static str),

    #[error("unexpected failure: {0}")]
    Unexpected(String),
}

impl Error {
    /// Stable snake_case name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidInput(_) => "invalid_input",
            Error::DivisionByZero => "division_by_zero",
            Error::NotFound(_) => "not_found",
            Error::EmptyCollection(_) => "empty_collection",
            Error::Unexpected(_) => "unexpected",
        }
    }
}

impl From<records::Error> for Error {
    fn from(e: records::Error) -> Self {
        Error::Unexpected(e.to_string())
    }
}

impl From<Error> for McpError {
    fn from(e: Error) -> Self {
        let data = Some(json!({ "kind": e.kind() }));
        let message = e.to_string();
        match e {
            Error::InvalidInput(_) | Error::DivisionByZero => McpError::invalid_params(message, data),
            Error::NotFound(_) => McpError::resource_not_found(message, data),
            Error::EmptyCollection(_) | Error::Unexpected(_) => {
                McpError::internal_error(message, data)
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
