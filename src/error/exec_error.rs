//! Unified error type for the crate.

use thiserror::Error;

use super::category::ErrorCategory;
use super::config::ConfigError;
use super::render::RenderError;
use super::stream::StreamError;
use crate::traits::HttpError;

/// Unified error type consolidating the domain-specific errors.
#[derive(Debug, Error)]
pub enum ExecStreamError {
    /// Transport errors from the HTTP seam.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// Stream controller errors.
    #[error(transparent)]
    Stream(#[from] StreamError),

    /// Output errors.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Configuration errors.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ExecStreamError {
    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ExecStreamError::Http(err) => match err {
                HttpError::ServerError { status, .. } if *status < 500 => ErrorCategory::Client,
                HttpError::ServerError { .. } => ErrorCategory::Server,
                HttpError::InvalidUrl(_) => ErrorCategory::Configuration,
                _ => ErrorCategory::Network,
            },
            ExecStreamError::Stream(err) => match err {
                StreamError::Connect(_) | StreamError::Read { .. } => ErrorCategory::Network,
                StreamError::HttpStatus { status, .. } if *status < 500 => ErrorCategory::Client,
                StreamError::HttpStatus { .. } | StreamError::StatusLookup { .. } => {
                    ErrorCategory::Server
                }
                StreamError::MaxReconnectsExceeded { .. }
                | StreamError::InvalidExecutionId { .. } => ErrorCategory::Client,
            },
            ExecStreamError::Render(_) => ErrorCategory::System,
            ExecStreamError::Config(_) => ErrorCategory::Configuration,
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            ExecStreamError::Http(err) => err.error_code(),
            ExecStreamError::Stream(err) => err.error_code(),
            ExecStreamError::Render(err) => err.error_code(),
            ExecStreamError::Config(err) => err.error_code(),
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            ExecStreamError::Stream(err) => err.user_message(),
            other => other.to_string(),
        }
    }
}

/// Type alias for Results using [`ExecStreamError`].
pub type ExecStreamResult<T> = Result<T, ExecStreamError>;
