//! Errors raised before the encoder can run.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for startup operations
pub type Result<T> = std::result::Result<T, StartupError>;

/// Failures that are reported through the startup failure envelope.
#[derive(Debug, Error)]
pub enum StartupError {
    /// Configuration file could not be read or parsed
    #[error("Configuration error in {path:?}: {message}")]
    Config { path: PathBuf, message: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The value to encode (or its baseline) is not valid input
    #[error("Input error: {0}")]
    Input(String),

    /// The logging subscriber could not be installed
    #[error("Logging error: {0}")]
    Logging(String),

    /// The configured expression engine is unavailable
    #[error("Engine error: {0}")]
    Engine(String),
}

impl StartupError {
    /// Failure kind shown before the message in the envelope.
    pub fn kind(&self) -> &'static str {
        match self {
            StartupError::Config { .. } => "ConfigError",
            StartupError::Io(_) => "IoError",
            StartupError::Input(_) => "InputError",
            StartupError::Logging(_) => "LoggingError",
            StartupError::Engine(_) => "EngineError",
        }
    }
}

impl From<serde_json::Error> for StartupError {
    fn from(err: serde_json::Error) -> Self {
        StartupError::Input(err.to_string())
    }
}
