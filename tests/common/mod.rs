//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use execstream::client::ControlPlaneClient;
use execstream::events::UnifiedEvent;
use execstream::stream::{ReconnectPolicy, StreamController, StreamHandle};
use wiremock::ResponseTemplate;

pub const EXECUTION_ID: &str = "exec-1";
pub const API_KEY: &str = "test-api-key";

pub fn stream_path(execution_id: &str) -> String {
    format!("/api/v1/executions/{}/stream", execution_id)
}

pub fn execution_path(execution_id: &str) -> String {
    format!("/api/v1/executions/{}", execution_id)
}

/// 200 response carrying an SSE body.
pub fn sse_response(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/event-stream")
        .set_body_string(body)
}

/// Controller against `base_url` with an instant reconnect.
pub fn controller(base_url: &str, max_reconnects: u32) -> StreamController {
    let client = ControlPlaneClient::with_url(base_url).with_auth(API_KEY);
    StreamController::new(Arc::new(client))
        .with_policy(ReconnectPolicy::new(max_reconnects, Duration::ZERO))
}

/// Collect events until the channel closes, failing the test on a hang.
pub async fn collect(handle: &mut StreamHandle) -> Vec<UnifiedEvent> {
    let mut events = Vec::new();
    let drain = async {
        while let Some(event) = handle.events.recv().await {
            events.push(event);
        }
    };
    tokio::time::timeout(Duration::from_secs(10), drain)
        .await
        .expect("stream did not close");
    events
}
