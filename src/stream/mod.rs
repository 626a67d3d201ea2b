//! Stream controllers.
//!
//! Each controller runs one background task that owns the connection and
//! talks to the rest of the program only through two channels: a bounded
//! event channel and an error channel of capacity one. Both close exactly
//! once, when the task ends.
//!
//! # Module structure
//! - `session` - reconnect policy, lifecycle state, frame id bookkeeping
//! - `controller` - the resumable execution stream
//! - `plan` - the single-connection planning stream

mod controller;
mod plan;
mod session;

pub use controller::StreamController;
pub use plan::{PlanStreamer, END_MARKERS};
pub use session::{
    compare_frame_ids, ReconnectPolicy, StreamSession, StreamState, DEFAULT_MAX_RECONNECTS,
    DEFAULT_RECONNECT_DELAY,
};

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::StreamError;
use crate::events::UnifiedEvent;

/// Default event channel capacity
pub const DEFAULT_EVENT_BUFFER: usize = 100;

/// Consumer side of a running stream.
#[derive(Debug)]
pub struct StreamHandle {
    pub events: mpsc::Receiver<UnifiedEvent>,
    pub errors: mpsc::Receiver<StreamError>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl StreamHandle {
    /// Stop the producer. Both channels close shortly after.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the producer task to exit.
    pub async fn join(self) {
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "stream task ended abnormally");
        }
    }
}

/// Channel ends handed to a producer task.
pub(crate) struct Outlets {
    pub events: mpsc::Sender<UnifiedEvent>,
    pub errors: mpsc::Sender<StreamError>,
    pub cancel: CancellationToken,
}

impl Outlets {
    /// Send an event, giving up if cancelled or the consumer went away.
    pub async fn publish(&self, event: UnifiedEvent) -> bool {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            sent = self.events.send(event) => sent.is_ok(),
        }
    }

    /// Surface an error. The channel holds one error, extra ones are dropped.
    pub fn fail(&self, err: StreamError) {
        tracing::warn!(error = %err, code = err.error_code(), "stream failed");
        if self.errors.try_send(err).is_err() {
            tracing::debug!("error channel full or closed");
        }
    }
}

/// Spawn a producer with fresh channels and an optional deadline.
pub(crate) fn spawn_producer<F, Fut>(
    buffer: usize,
    cancel: CancellationToken,
    deadline: Option<Duration>,
    producer: F,
) -> StreamHandle
where
    F: FnOnce(Outlets) -> Fut,
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    let (events_tx, events_rx) = mpsc::channel(buffer.max(1));
    let (errors_tx, errors_rx) = mpsc::channel(1);

    let token = cancel.child_token();
    let finished = CancellationToken::new();
    if let Some(deadline) = deadline {
        let timer = token.clone();
        let finished = finished.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(deadline) => {
                    tracing::info!(?deadline, "stream deadline reached");
                    timer.cancel();
                }
                _ = timer.cancelled() => {}
                _ = finished.cancelled() => {}
            }
        });
    }

    let outlets = Outlets {
        events: events_tx,
        errors: errors_tx,
        cancel: token.clone(),
    };
    let run = producer(outlets);
    let task = tokio::spawn(async move {
        run.await;
        finished.cancel();
    });

    StreamHandle {
        events: events_rx,
        errors: errors_rx,
        cancel: token,
        task,
    }
}
