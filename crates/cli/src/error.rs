//! CLI error types.

use thiserror::Error;

use crate::config::ConfigError;

/// CLI errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The config file exists but could not be loaded.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// A server failed to start or stopped with an error.
    #[error("server error: {0}")]
    Serve(String),

    #[error(transparent)]
    Client(#[from] client::Error),

    #[error(transparent)]
    Server(#[from] server::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
