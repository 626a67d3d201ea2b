//! Configuration error types.

use thiserror::Error;

/// Errors raised while building a [`crate::config::StreamConfig`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// An environment variable held a value that could not be parsed.
    #[error("Invalid value {value:?} for {key}")]
    InvalidValue { key: String, value: String },

    /// An output format name was not recognised.
    #[error("Unknown stream format: {0}")]
    UnknownFormat(String),

    /// A required setting is missing.
    #[error("Missing required setting: {0}")]
    Missing(String),
}

impl ConfigError {
    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            ConfigError::InvalidValue { .. } => "E_CONFIG_VALUE",
            ConfigError::UnknownFormat(_) => "E_CONFIG_FORMAT",
            ConfigError::Missing(_) => "E_CONFIG_MISSING",
        }
    }
}
