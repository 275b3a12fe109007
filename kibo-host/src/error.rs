//! Error types for the host layer.

use kibo_core::{ConfigError, ValidationError};
use thiserror::Error;

/// Host-level errors: loading configuration, wiring telemetry, running the ticker.
#[derive(Debug, Error)]
pub enum HostError {
    /// Reading a configuration or script file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid TOML or does not match the schema.
    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// The configuration parsed but describes an invalid engine.
    #[error("invalid engine config: {0}")]
    Config(#[from] ConfigError),

    /// A sensor or conversation payload was rejected.
    #[error("rejected input: {0}")]
    Validation(#[from] ValidationError),

    /// A global tracing subscriber was already installed.
    #[error("tracing init failed: {0}")]
    Telemetry(#[from] tracing_subscriber::util::TryInitError),

    /// The log filter string could not be parsed.
    #[error("invalid log filter: {0}")]
    LogFilter(#[from] tracing_subscriber::filter::ParseError),

    /// A session script is well-formed TOML but cannot be replayed.
    #[error("invalid script: {0}")]
    Script(String),

    /// The ticker was started twice or stopped while idle.
    #[error("ticker {0}")]
    Ticker(&'static str),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, HostError>;
