//! Error handling for the streaming core.
//!
//! - **Error Categories**: high-level classification for handling decisions
//! - **Domain-specific Errors**: stream, render and configuration errors
//!   (transport errors live next to the [`crate::traits::HttpClient`] seam)
//! - **Unified Error Type**: [`ExecStreamError`] consolidates them
//!
//! | Category | Description | Retryable |
//! |----------|-------------|-----------|
//! | Network | Connection, reset, timeout | Yes |
//! | Server | 5xx, status lookup failures | Yes |
//! | Client | Bad id, auth, exhausted retries | No |
//! | Configuration | Invalid environment values | No |
//! | System | Output sink failures | No |

mod category;
mod config;
mod exec_error;
mod render;
mod stream;

pub use category::ErrorCategory;
pub use config::ConfigError;
pub use exec_error::{ExecStreamError, ExecStreamResult};
pub use render::RenderError;
pub use stream::StreamError;
