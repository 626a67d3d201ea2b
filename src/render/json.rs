//! Newline-delimited JSON renderer.

use std::io::Write;
use std::sync::Mutex;

use super::Renderer;
use crate::error::RenderError;
use crate::events::UnifiedEvent;

/// Writes each event as one self-contained JSON object per line.
///
/// Tool inputs/outputs are stripped unless verbose, matching the verbosity
/// filter, so the rule holds even when the renderer is used on its own.
pub struct JsonRenderer<W: Write + Send> {
    out: Mutex<W>,
    verbose: bool,
}

impl<W: Write + Send> JsonRenderer<W> {
    pub fn new(out: W, verbose: bool) -> Self {
        Self {
            out: Mutex::new(out),
            verbose,
        }
    }

    /// Take back the sink.
    pub fn into_inner(self) -> Result<W, RenderError> {
        self.out.into_inner().map_err(|_| RenderError::Poisoned)
    }
}

impl<W: Write + Send> Renderer for JsonRenderer<W> {
    fn render(&self, event: &UnifiedEvent) -> Result<(), RenderError> {
        let mut line = if !self.verbose && event.tool().is_some() {
            let mut stripped = event.clone();
            if let Some(tool) = stripped.tool_mut() {
                tool.strip_io();
            }
            serde_json::to_vec(&stripped)?
        } else {
            serde_json::to_vec(event)?
        };
        line.push(b'\n');

        let mut out = self.out.lock().map_err(|_| RenderError::Poisoned)?;
        out.write_all(&line)?;
        Ok(())
    }

    fn flush(&self) -> Result<(), RenderError> {
        let mut out = self.out.lock().map_err(|_| RenderError::Poisoned)?;
        out.flush()?;
        Ok(())
    }
}
