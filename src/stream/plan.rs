//! Single-connection planning stream.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::{spawn_producer, Outlets, StreamHandle, DEFAULT_EVENT_BUFFER};
use crate::error::StreamError;
use crate::mapper::{EventMapper, PlanEventMapper};
use crate::sse::{FrameReader, ReadOutcome};
use crate::traits::PlanBackend;

/// Data payloads that mark the end of a planning stream.
pub const END_MARKERS: [&str; 2] = ["[DONE]", "end of stream"];

/// Streams plan generation progress.
///
/// Planning streams are short-lived and not resumable: there is one
/// connection, no status lookup and no reconnection. Channel and close
/// semantics match [`super::StreamController`].
#[derive(Clone)]
pub struct PlanStreamer {
    backend: Arc<dyn PlanBackend>,
    mapper: PlanEventMapper,
    event_buffer: usize,
    deadline: Option<Duration>,
}

impl PlanStreamer {
    pub fn new(backend: Arc<dyn PlanBackend>) -> Self {
        Self {
            backend,
            mapper: PlanEventMapper::new(),
            event_buffer: DEFAULT_EVENT_BUFFER,
            deadline: None,
        }
    }

    pub fn with_event_buffer(mut self, capacity: usize) -> Self {
        self.event_buffer = capacity;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn start(&self, request: Value, cancel: CancellationToken) -> StreamHandle {
        let streamer = self.clone();
        spawn_producer(self.event_buffer, cancel, self.deadline, move |outlets| async move {
            streamer.run(&request, &outlets).await
        })
    }

    async fn run(&self, request: &Value, outlets: &Outlets) {
        let opened = tokio::select! {
            biased;
            _ = outlets.cancel.cancelled() => return,
            opened = self.backend.open_plan_stream(request) => opened,
        };

        let stream = match opened {
            Ok(stream) => stream,
            Err(err) => {
                outlets.fail(err);
                return;
            }
        };
        info!("plan stream connected");

        let mut reader = FrameReader::new(stream);
        loop {
            let next = tokio::select! {
                biased;
                _ = outlets.cancel.cancelled() => return,
                next = reader.next_frame() => next,
            };

            let frame = match next {
                Ok(ReadOutcome::Frame(frame)) => frame,
                Ok(ReadOutcome::EndOfStream) => {
                    debug!("plan stream closed");
                    return;
                }
                Err(err) => {
                    outlets.fail(StreamError::Read {
                        message: err.to_string(),
                    });
                    return;
                }
            };

            if END_MARKERS.contains(&frame.data.trim()) {
                debug!(marker = %frame.data, "plan stream end marker");
                return;
            }

            let event = self.mapper.map_frame(&frame);
            let terminal = event.is_terminal();
            if !outlets.publish(event).await || terminal {
                return;
            }
        }
    }
}
