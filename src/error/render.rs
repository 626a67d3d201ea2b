//! Renderer error types.

use thiserror::Error;

/// Errors returned synchronously by [`crate::render::Renderer`] calls.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Writing to the output sink failed.
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),

    /// The event could not be serialized.
    #[error("Failed to serialize event: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A previous writer panicked while holding the output lock.
    #[error("Renderer output lock poisoned")]
    Poisoned,
}

impl RenderError {
    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            RenderError::Io(_) => "E_RENDER_IO",
            RenderError::Serialize(_) => "E_RENDER_JSON",
            RenderError::Poisoned => "E_RENDER_LOCK",
        }
    }

    /// Broken pipes happen when the reader (e.g. `head`) goes away.
    pub fn is_broken_pipe(&self) -> bool {
        matches!(self, RenderError::Io(e) if e.kind() == std::io::ErrorKind::BrokenPipe)
    }
}
