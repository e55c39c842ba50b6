//! Configuration loading from mcp-demo.toml.

use std::path::Path;

use clap::ValueEnum;
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub log: LogConfig,

    /// Defaults for the `client` command.
    #[serde(default)]
    pub client: ClientConfig,
}

#[derive(Debug, Default, Deserialize)]
pub struct LogConfig {
    /// Log filter directive, e.g. "info" or "server=debug".
    pub level: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ClientConfig {
    /// Which demo server to run against.
    #[serde(default)]
    pub server: ServerKind,

    /// How to reach the server.
    #[serde(default)]
    pub transport: Transport,
}

/// The demo servers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ServerKind {
    #[default]
    Calculator,
    DataProcessor,
}

impl ServerKind {
    /// Subcommand that serves this server on stdio.
    pub fn subcommand(self) -> &'static str {
        match self {
            ServerKind::Calculator => "calculator",
            ServerKind::DataProcessor => "data-processor",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Transport {
    /// Server runs on a task inside this process.
    #[default]
    InProcess,
    /// Server runs as a child process speaking MCP over stdio.
    Stdio,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Load configuration, falling back to defaults when the file is absent.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from TOML string.
    pub fn parse(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(String),
}
