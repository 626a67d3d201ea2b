//! Control plane seams used by the stream controllers.

use async_trait::async_trait;
use serde_json::Value;

use super::http::ByteStream;
use crate::error::StreamError;
use crate::models::ExecutionStatus;

/// Source of execution event streams.
///
/// The stream controller only ever talks to the control plane through this
/// trait, which keeps reconnection logic testable with scripted backends.
#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    /// Open the event stream for an execution.
    ///
    /// `resume_from` is the last frame id seen on a previous connection. The
    /// server uses it to replay events that were missed while disconnected.
    async fn open_stream(
        &self,
        execution_id: &str,
        resume_from: Option<&str>,
    ) -> Result<ByteStream, StreamError>;

    /// Side-channel "get execution by id" lookup.
    async fn get_execution_status(&self, execution_id: &str)
        -> Result<ExecutionStatus, StreamError>;
}

/// Source of planning-channel streams.
#[async_trait]
pub trait PlanBackend: Send + Sync {
    /// Submit a plan request and stream its progress.
    async fn open_plan_stream(&self, request: &Value) -> Result<ByteStream, StreamError>;
}
