//! Output renderers.
//!
//! Both renderers serialize writes behind an internal lock, so one renderer
//! may be shared by several producers without interleaving lines.
//!
//! # Module structure
//! - `json` - newline-delimited JSON for machine consumers
//! - `text` - boxed, optionally colored output for humans
//! - `style` - terminal styling helpers

mod json;
pub mod style;
mod text;

pub use json::JsonRenderer;
pub use text::{TextOptions, TextRenderer};

use crate::error::RenderError;
use crate::events::UnifiedEvent;

/// Default number of tool output lines shown by the text renderer.
pub const DEFAULT_OUTPUT_LINES: usize = 10;

/// Tool output line limit in verbose text mode.
pub const VERBOSE_OUTPUT_LINES: usize = 50;

/// An output sink for unified events.
pub trait Renderer: Send + Sync {
    fn render(&self, event: &UnifiedEvent) -> Result<(), RenderError>;

    /// Push buffered output to the sink.
    fn flush(&self) -> Result<(), RenderError>;

    /// Final flush. The renderer should not be used afterwards.
    fn close(&self) -> Result<(), RenderError> {
        self.flush()
    }
}
