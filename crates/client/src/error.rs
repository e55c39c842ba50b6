//! Client error types.

use rmcp::service::ServiceError;
use thiserror::Error;

/// Boxed error from the `rmcp` handshake or task machinery.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to spawn server: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("failed to connect to server: {0}")]
    Connect(BoxError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("tool call failed: {0}")]
    ToolFailed(String),

    #[error("resource {uri} returned no text content")]
    EmptyResource { uri: String },

    #[error("prompt {name} returned no text message")]
    EmptyPrompt { name: String },

    #[error("invalid payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("failed to shut down: {0}")]
    Shutdown(BoxError),

    #[error("output error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
