//! Streaming-related error types.
//!
//! Errors raised by the stream controller while connecting to, reading from
//! and recovering an execution event stream.

use thiserror::Error;

use crate::traits::HttpError;

/// Stream-specific error variants.
#[derive(Debug, Clone, Error)]
pub enum StreamError {
    /// Opening the connection failed before any response arrived.
    #[error("Failed to connect to stream: {0}")]
    Connect(HttpError),

    /// The endpoint answered with a non-200 status.
    #[error("Stream returned status {status}: {message}")]
    HttpStatus { status: u16, message: String },

    /// The byte stream failed mid-read.
    #[error("Error reading stream: {message}")]
    Read { message: String },

    /// The side-channel "get execution" lookup failed.
    #[error("Failed to check execution status: {message}")]
    StatusLookup { message: String },

    /// The reconnection budget was used up without reaching a terminal state.
    #[error("max reconnection attempts ({max}) exceeded")]
    MaxReconnectsExceeded { max: u32 },

    /// The execution id is empty or otherwise unusable in a URL.
    #[error("Invalid execution id: {id:?}")]
    InvalidExecutionId { id: String },
}

impl StreamError {
    /// Check if this error is likely transient and the stream can be reopened.
    pub fn is_retryable(&self) -> bool {
        match self {
            StreamError::Connect(err) => err.is_retryable(),
            StreamError::HttpStatus { status, .. } => {
                *status >= 500 || *status == 429 || *status == 408
            }
            StreamError::Read { .. } | StreamError::StatusLookup { .. } => true,
            StreamError::MaxReconnectsExceeded { .. } | StreamError::InvalidExecutionId { .. } => {
                false
            }
        }
    }

    /// Check if this error ends the stream for good.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StreamError::MaxReconnectsExceeded { .. } | StreamError::InvalidExecutionId { .. }
        )
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            StreamError::Connect(_) => {
                "Could not reach the execution stream. Retrying...".to_string()
            }
            StreamError::HttpStatus { status, .. } => match status {
                401 | 403 => "The API key was rejected by the control plane.".to_string(),
                404 => "The execution was not found.".to_string(),
                _ => format!("The execution stream returned HTTP {}.", status),
            },
            StreamError::Read { .. } => {
                "The connection to the execution stream was lost.".to_string()
            }
            StreamError::StatusLookup { .. } => {
                "Could not check the execution status.".to_string()
            }
            StreamError::MaxReconnectsExceeded { max } => format!(
                "Gave up after {} reconnection attempts. The execution may still be running.",
                max
            ),
            StreamError::InvalidExecutionId { id } => {
                format!("'{}' is not a valid execution id.", id)
            }
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            StreamError::Connect(_) => "E_STREAM_CONN",
            StreamError::HttpStatus { .. } => "E_STREAM_STATUS",
            StreamError::Read { .. } => "E_STREAM_READ",
            StreamError::StatusLookup { .. } => "E_STREAM_LOOKUP",
            StreamError::MaxReconnectsExceeded { .. } => "E_STREAM_MAX_RECONNECT",
            StreamError::InvalidExecutionId { .. } => "E_STREAM_EXEC_ID",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_reconnects_display() {
        let err = StreamError::MaxReconnectsExceeded { max: 100 };
        assert_eq!(err.to_string(), "max reconnection attempts (100) exceeded");
        assert!(err.is_terminal());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_http_status_retryable() {
        let server = StreamError::HttpStatus {
            status: 503,
            message: "unavailable".to_string(),
        };
        let auth = StreamError::HttpStatus {
            status: 401,
            message: "unauthorized".to_string(),
        };
        assert!(server.is_retryable());
        assert!(!auth.is_retryable());
        assert!(auth.user_message().contains("API key"));
    }

    #[test]
    fn test_read_error_is_retryable() {
        let err = StreamError::Read {
            message: "connection reset".to_string(),
        };
        assert!(err.is_retryable());
        assert!(!err.is_terminal());
        assert_eq!(err.error_code(), "E_STREAM_READ");
    }
}
