//! Filter chain between the stream controller and a renderer.
//!
//! Filters run in insertion order. Each may rewrite the event or drop it;
//! a drop short-circuits the rest of the chain and skips rendering.

mod filters;

pub use filters::{
    DedupFilter, EventTypeFilter, KeepaliveFilter, TimestampFilter, VerbosityFilter,
};

use std::sync::Arc;

use crate::error::RenderError;
use crate::events::UnifiedEvent;
use crate::render::Renderer;

/// One step of the pipeline. Returning `None` drops the event.
pub trait EventFilter: Send {
    /// Short name used in trace logs.
    fn name(&self) -> &'static str;

    fn apply(&mut self, event: UnifiedEvent) -> Option<UnifiedEvent>;
}

/// Ordered filters feeding a single renderer.
pub struct EventPipeline {
    renderer: Arc<dyn Renderer>,
    filters: Vec<Box<dyn EventFilter>>,
}

impl EventPipeline {
    pub fn new(renderer: Arc<dyn Renderer>) -> Self {
        Self {
            renderer,
            filters: Vec::new(),
        }
    }

    /// Append a filter (builder form).
    pub fn with_filter(mut self, filter: impl EventFilter + 'static) -> Self {
        self.add_filter(filter);
        self
    }

    pub fn add_filter(&mut self, filter: impl EventFilter + 'static) {
        self.filters.push(Box::new(filter));
    }

    /// Filter names in the order they run.
    pub fn filter_names(&self) -> Vec<&'static str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    pub fn renderer(&self) -> &Arc<dyn Renderer> {
        &self.renderer
    }

    /// Run the filter chain without rendering.
    pub fn apply(&mut self, event: UnifiedEvent) -> Option<UnifiedEvent> {
        let mut event = event;
        for filter in &mut self.filters {
            match filter.apply(event) {
                Some(next) => event = next,
                None => {
                    tracing::trace!(filter = filter.name(), "event dropped");
                    return None;
                }
            }
        }
        Some(event)
    }

    /// Filter then render. Returns whether the event reached the renderer.
    pub fn process(&mut self, event: UnifiedEvent) -> Result<bool, RenderError> {
        match self.apply(event) {
            Some(event) => {
                self.renderer.render(&event)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn flush(&self) -> Result<(), RenderError> {
        self.renderer.flush()
    }

    pub fn close(&self) -> Result<(), RenderError> {
        self.renderer.close()
    }
}
