//! Error category classification.
//!
//! Categories drive the handling decision for an error: whether the stream
//! controller may retry it and how the CLI explains it to the user.

use std::fmt;

/// High-level categorization of errors for handling decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-related errors (connection refused, reset, timeout).
    /// Generally transient and retryable.
    Network,

    /// Backend errors (HTTP 5xx, unexpected stream status).
    /// Generally transient and retryable after a delay.
    Server,

    /// Client-side errors (bad request, invalid id, exhausted retries).
    Client,

    /// Configuration errors (invalid environment values, unknown format).
    Configuration,

    /// System/OS errors (writing to the output sink).
    System,
}

impl ErrorCategory {
    /// Returns true if errors in this category are generally transient.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::Network | ErrorCategory::Server)
    }

    /// Returns a short label for the category suitable for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "network",
            ErrorCategory::Server => "server",
            ErrorCategory::Client => "client",
            ErrorCategory::Configuration => "configuration",
            ErrorCategory::System => "system",
        }
    }

    /// Returns suggested recovery actions for this category.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "Check your network connection and try again",
            ErrorCategory::Server => {
                "The control plane may be experiencing issues. Please try again later"
            }
            ErrorCategory::Client => "Check the execution id and your API key",
            ErrorCategory::Configuration => "Check your EXECSTREAM_* environment variables",
            ErrorCategory::System => "Check that the output destination is writable",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
