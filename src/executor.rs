//! Consumer side of a stream: filter chain, renderer and the receive loop.

use std::io::Write;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{StreamConfig, StreamFormat};
use crate::error::{ExecStreamError, RenderError, StreamError};
use crate::events::UnifiedEvent;
use crate::mapper::EventMapper;
use crate::pipeline::{
    DedupFilter, EventPipeline, EventTypeFilter, KeepaliveFilter, TimestampFilter,
    VerbosityFilter,
};
use crate::render::{JsonRenderer, Renderer, TextRenderer};
use crate::sse::parse_frames;
use crate::stream::{StreamHandle, END_MARKERS};

/// What a single render attempt means for the loop.
enum Rendered {
    Continue,
    /// The sink is gone, stop consuming.
    SinkClosed,
}

/// Drives events from a [`StreamHandle`] through the pipeline into a renderer.
///
/// The filter chain is fixed: keepalive, verbosity, dedup, timestamp, then
/// the event type allow-list.
pub struct StreamingExecutor {
    pipeline: EventPipeline,
    format: StreamFormat,
}

impl StreamingExecutor {
    /// Build with an explicit renderer. `config.format` is only recorded.
    pub fn new(config: &StreamConfig, renderer: Arc<dyn Renderer>) -> Self {
        let pipeline = EventPipeline::new(renderer)
            .with_filter(KeepaliveFilter)
            .with_filter(VerbosityFilter::new(config.verbose))
            .with_filter(DedupFilter::new())
            .with_filter(TimestampFilter::new())
            .with_filter(EventTypeFilter::new(config.event_types.iter().copied()));
        Self {
            pipeline,
            format: config.format.resolve(),
        }
    }

    /// Build with the renderer `config.format` resolves to.
    pub fn for_writer<W>(config: &StreamConfig, out: W, interactive: bool) -> Self
    where
        W: Write + Send + 'static,
    {
        let renderer: Arc<dyn Renderer> = match config.format.resolve() {
            StreamFormat::Json => Arc::new(JsonRenderer::new(out, config.verbose)),
            StreamFormat::Text | StreamFormat::Auto => {
                Arc::new(TextRenderer::new(out, config.text_options(interactive)))
            }
        };
        Self::new(config, renderer)
    }

    /// The resolved output format.
    pub fn format(&self) -> StreamFormat {
        self.format
    }

    pub fn pipeline(&self) -> &EventPipeline {
        &self.pipeline
    }

    /// Filter and render one event.
    pub fn process(&mut self, event: UnifiedEvent) -> Result<bool, RenderError> {
        self.pipeline.process(event)
    }

    fn render(&mut self, event: UnifiedEvent) -> Rendered {
        let event_type = event.event_type;
        match self.pipeline.process(event) {
            Ok(_) => Rendered::Continue,
            Err(err) if err.is_broken_pipe() => {
                debug!("output closed by reader");
                Rendered::SinkClosed
            }
            Err(err) => {
                warn!(error = %err, code = err.error_code(), %event_type, "failed to render event");
                Rendered::Continue
            }
        }
    }

    fn render_stream_error(&mut self, err: &StreamError) {
        let event = UnifiedEvent::error(err.to_string(), Some(err.error_code().to_string()), false);
        self.render(event);
    }

    /// Consume a running stream until a terminal event, a stream error,
    /// cancellation, or the producer closing its channels.
    ///
    /// A stream error is rendered as an `error` event and returned. The
    /// producer is cancelled and joined before returning.
    pub async fn run(
        &mut self,
        mut handle: StreamHandle,
        cancel: &CancellationToken,
    ) -> Result<(), ExecStreamError> {
        let mut errors_open = true;

        let result = loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("stream cancelled");
                    break Ok(());
                }
                event = handle.events.recv() => match event {
                    Some(event) => {
                        let terminal = event.is_terminal();
                        if let Rendered::SinkClosed = self.render(event) {
                            break Ok(());
                        }
                        if terminal {
                            break Ok(());
                        }
                    }
                    None => {
                        // The producer is done. An error it sent is still queued.
                        if let Ok(err) = handle.errors.try_recv() {
                            self.render_stream_error(&err);
                            break Err(err.into());
                        }
                        break Ok(());
                    }
                },
                err = handle.errors.recv(), if errors_open => match err {
                    Some(err) => {
                        self.render_stream_error(&err);
                        break Err(err.into());
                    }
                    None => errors_open = false,
                },
            }
        };

        handle.cancel();
        handle.join().await;

        if let Err(err) = self.pipeline.flush() {
            warn!(error = %err, "failed to flush output");
        }
        result
    }

    /// Render a captured SSE transcript with `mapper`.
    ///
    /// Stops at the first terminal event or end marker. Returns how many
    /// events reached the renderer.
    pub fn replay(&mut self, transcript: &str, mapper: &dyn EventMapper) -> usize {
        let mut rendered = 0;
        for frame in parse_frames(transcript) {
            if END_MARKERS.contains(&frame.data.trim()) {
                break;
            }
            let event = mapper.map_frame(&frame);
            let terminal = event.is_terminal();
            match self.pipeline.process(event) {
                Ok(true) => rendered += 1,
                Ok(false) => {}
                Err(err) if err.is_broken_pipe() => break,
                Err(err) => warn!(error = %err, "failed to render replayed event"),
            }
            if terminal {
                break;
            }
        }
        if let Err(err) = self.pipeline.flush() {
            warn!(error = %err, "failed to flush output");
        }
        rendered
    }

    /// Final flush of the renderer.
    pub fn close(&self) -> Result<(), RenderError> {
        self.pipeline.close()
    }
}
