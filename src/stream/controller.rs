//! Resumable execution stream controller.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::session::{ReconnectPolicy, StreamSession, StreamState};
use super::{spawn_producer, Outlets, StreamHandle, DEFAULT_EVENT_BUFFER};
use crate::error::StreamError;
use crate::events::UnifiedEvent;
use crate::mapper::{EventMapper, ExecutionEventMapper};
use crate::models::ExecutionStatus;
use crate::sse::{FrameReader, ReadOutcome};
use crate::traits::{ByteStream, ExecutionBackend};

/// Metadata key set on a `done` event synthesized from a status lookup.
pub const META_FINAL_STATUS: &str = "final_status";

/// How one connection ended.
enum ConnectionEnd {
    /// A terminal event was published.
    Terminal,
    /// Cancelled, or the consumer dropped its receiver.
    Abandoned,
    /// Clean end of stream without a terminal event.
    EndOfStream,
    /// Connect or read failure that may clear up on reconnect.
    Failed(StreamError),
}

/// Owns the connection lifecycle of execution streams.
///
/// `Connecting -> Streaming -> (Terminal | Disconnected)`, with
/// `Disconnected -> Connecting` on reconnect. A disconnect without a
/// terminal event consults the status lookup: a finished execution gets a
/// synthesized `done`, anything else reconnects with the last frame id as
/// the resumption token until the policy's cap is exceeded.
#[derive(Clone)]
pub struct StreamController {
    backend: Arc<dyn ExecutionBackend>,
    mapper: Arc<dyn EventMapper>,
    policy: ReconnectPolicy,
    event_buffer: usize,
    deadline: Option<Duration>,
}

impl StreamController {
    pub fn new(backend: Arc<dyn ExecutionBackend>) -> Self {
        Self {
            backend,
            mapper: Arc::new(ExecutionEventMapper::new()),
            policy: ReconnectPolicy::default(),
            event_buffer: DEFAULT_EVENT_BUFFER,
            deadline: None,
        }
    }

    pub fn with_policy(mut self, policy: ReconnectPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_event_buffer(mut self, capacity: usize) -> Self {
        self.event_buffer = capacity;
        self
    }

    pub fn with_mapper(mut self, mapper: Arc<dyn EventMapper>) -> Self {
        self.mapper = mapper;
        self
    }

    /// Cancel the stream automatically after `deadline`.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn policy(&self) -> ReconnectPolicy {
        self.policy
    }

    /// Start streaming an execution on a background task.
    pub fn start(&self, execution_id: &str, cancel: CancellationToken) -> StreamHandle {
        let controller = self.clone();
        let execution_id = execution_id.to_string();
        spawn_producer(self.event_buffer, cancel, self.deadline, move |outlets| async move {
            controller.run(&execution_id, &outlets).await
        })
    }

    async fn run(&self, execution_id: &str, outlets: &Outlets) {
        let mut session = StreamSession::new(self.policy);

        loop {
            if outlets.cancel.is_cancelled() {
                debug!(execution_id, "stream cancelled");
                break;
            }

            session.transition(StreamState::Connecting);
            let opened = tokio::select! {
                biased;
                _ = outlets.cancel.cancelled() => break,
                opened = self
                    .backend
                    .open_stream(execution_id, session.last_seen_frame_id.as_deref()) => opened,
            };

            let end = match opened {
                Ok(stream) => {
                    info!(
                        execution_id,
                        reconnects = session.reconnect_count,
                        "stream connected"
                    );
                    session.transition(StreamState::Streaming);
                    self.consume(stream, &mut session, outlets).await
                }
                Err(err @ StreamError::HttpStatus { .. }) if !err.is_retryable() => {
                    // A finished execution may no longer serve its stream.
                    warn!(
                        execution_id,
                        error = %err,
                        "stream refused, checking execution status"
                    );
                    session.transition(StreamState::Disconnected);
                    let lookup = tokio::select! {
                        biased;
                        _ = outlets.cancel.cancelled() => break,
                        lookup = self.backend.get_execution_status(execution_id) => lookup,
                    };
                    match lookup {
                        Ok(status) if status.is_terminal() => {
                            Self::publish_final(execution_id, status, outlets).await;
                        }
                        _ => outlets.fail(err),
                    }
                    break;
                }
                Err(err) if !err.is_retryable() => {
                    outlets.fail(err);
                    break;
                }
                Err(err) => ConnectionEnd::Failed(err),
            };

            match end {
                ConnectionEnd::Terminal => {
                    info!(execution_id, "stream reached terminal event");
                    break;
                }
                ConnectionEnd::Abandoned => break,
                ConnectionEnd::EndOfStream => {
                    warn!(execution_id, "stream ended without a terminal event");
                }
                ConnectionEnd::Failed(err) => {
                    warn!(execution_id, error = %err, "stream disconnected");
                }
            }

            session.transition(StreamState::Disconnected);

            let lookup = tokio::select! {
                biased;
                _ = outlets.cancel.cancelled() => break,
                lookup = self.backend.get_execution_status(execution_id) => lookup,
            };

            match lookup {
                Ok(status) if status.is_terminal() => {
                    Self::publish_final(execution_id, status, outlets).await;
                    break;
                }
                Ok(status) => debug!(execution_id, %status, "execution still active"),
                Err(err) => warn!(
                    execution_id,
                    error = %err,
                    "status lookup failed, treating status as unknown"
                ),
            }

            if !session.begin_reconnect() {
                outlets.fail(StreamError::MaxReconnectsExceeded {
                    max: session.max_reconnects,
                });
                break;
            }

            info!(
                execution_id,
                attempt = session.reconnect_count,
                resume_from = ?session.last_seen_frame_id,
                "reconnecting"
            );
            tokio::select! {
                biased;
                _ = outlets.cancel.cancelled() => break,
                _ = tokio::time::sleep(session.backoff_delay) => {}
            }
        }

        session.transition(StreamState::Terminal);
    }

    /// Emit the `done` event for an execution found finished by the lookup.
    async fn publish_final(execution_id: &str, status: ExecutionStatus, outlets: &Outlets) {
        info!(execution_id, %status, "execution finished while disconnected");
        let mut done = UnifiedEvent::done().with_execution_id(execution_id);
        done.metadata.insert(META_FINAL_STATUS, status.as_str());
        outlets.publish(done).await;
    }

    /// Read frames off one connection until it ends.
    async fn consume(
        &self,
        stream: ByteStream,
        session: &mut StreamSession,
        outlets: &Outlets,
    ) -> ConnectionEnd {
        let mut reader = FrameReader::new(stream);

        loop {
            let next = tokio::select! {
                biased;
                _ = outlets.cancel.cancelled() => return ConnectionEnd::Abandoned,
                next = reader.next_frame() => next,
            };

            let frame = match next {
                Ok(ReadOutcome::Frame(frame)) => frame,
                Ok(ReadOutcome::EndOfStream) => return ConnectionEnd::EndOfStream,
                Err(err) => {
                    return ConnectionEnd::Failed(StreamError::Read {
                        message: err.to_string(),
                    })
                }
            };

            if !session.observe_frame_id(frame.id.as_deref()) {
                debug!(id = ?frame.id, "skipping replayed frame");
                continue;
            }

            let event = self.mapper.map_frame(&frame);
            let terminal = event.is_terminal();
            if !outlets.publish(event).await {
                return ConnectionEnd::Abandoned;
            }
            if terminal {
                return ConnectionEnd::Terminal;
            }
        }
    }
}
