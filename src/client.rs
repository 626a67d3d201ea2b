//! Control plane client.
//!
//! Builds the execution stream, execution lookup and plan stream requests on
//! top of any [`HttpClient`], and implements the backend traits the stream
//! controllers consume.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

use crate::adapters::ReqwestHttpClient;
use crate::error::StreamError;
use crate::models::{decode_execution, ExecutionStatus};
use crate::traits::{ByteStream, ExecutionBackend, Headers, HttpClient, HttpError, PlanBackend};

/// Default control plane base URL
pub const DEFAULT_BASE_URL: &str = "https://control-plane.kubiya.ai";

/// Header carrying the resumption token on reconnect
pub const LAST_EVENT_ID_HEADER: &str = "Last-Event-ID";

/// Client for the control plane's execution and planning endpoints.
#[derive(Debug, Clone)]
pub struct ControlPlaneClient<C = ReqwestHttpClient> {
    /// Base URL without a trailing slash
    pub base_url: String,
    http: C,
    api_key: Option<String>,
}

impl ControlPlaneClient<ReqwestHttpClient> {
    /// Create a client for the default base URL.
    pub fn new() -> Self {
        Self::with_url(DEFAULT_BASE_URL)
    }

    /// Create a client for a custom base URL.
    pub fn with_url(base_url: impl Into<String>) -> Self {
        Self::with_http(base_url, ReqwestHttpClient::new())
    }
}

impl Default for ControlPlaneClient<ReqwestHttpClient> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: HttpClient> ControlPlaneClient<C> {
    /// Create a client over a specific HTTP transport.
    pub fn with_http(base_url: impl Into<String>, http: C) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http,
            api_key: None,
        }
    }

    /// Attach a bearer token to every request.
    pub fn with_auth(mut self, api_key: impl Into<String>) -> Self {
        let key = api_key.into();
        self.api_key = (!key.is_empty()).then_some(key);
        self
    }

    pub fn http(&self) -> &C {
        &self.http
    }

    pub fn stream_url(&self, execution_id: &str) -> String {
        format!("{}/api/v1/executions/{}/stream", self.base_url, execution_id)
    }

    pub fn execution_url(&self, execution_id: &str) -> String {
        format!("{}/api/v1/executions/{}", self.base_url, execution_id)
    }

    pub fn plan_stream_url(&self) -> String {
        format!("{}/api/v1/tasks/plan/stream", self.base_url)
    }

    fn base_headers(&self) -> Headers {
        let mut headers = Headers::new();
        if let Some(key) = &self.api_key {
            headers.insert("Authorization".to_string(), format!("Bearer {}", key));
        }
        headers
    }

    fn stream_headers(&self) -> Headers {
        let mut headers = self.base_headers();
        headers.insert("Accept".to_string(), "text/event-stream".to_string());
        headers.insert("Cache-Control".to_string(), "no-cache".to_string());
        headers.insert("Connection".to_string(), "keep-alive".to_string());
        headers
    }
}

fn validate_execution_id(execution_id: &str) -> Result<(), StreamError> {
    let valid = !execution_id.is_empty()
        && !execution_id
            .chars()
            .any(|c| c == '/' || c == '?' || c == '#' || c.is_whitespace());
    if valid {
        Ok(())
    } else {
        Err(StreamError::InvalidExecutionId {
            id: execution_id.to_string(),
        })
    }
}

fn stream_error(err: HttpError) -> StreamError {
    match err {
        HttpError::ServerError { status, message } => StreamError::HttpStatus { status, message },
        other => StreamError::Connect(other),
    }
}

#[async_trait]
impl<C: HttpClient> ExecutionBackend for ControlPlaneClient<C> {
    async fn open_stream(
        &self,
        execution_id: &str,
        resume_from: Option<&str>,
    ) -> Result<ByteStream, StreamError> {
        validate_execution_id(execution_id)?;

        let url = self.stream_url(execution_id);
        let mut headers = self.stream_headers();
        if let Some(last_id) = resume_from.filter(|id| !id.is_empty()) {
            headers.insert(LAST_EVENT_ID_HEADER.to_string(), last_id.to_string());
        }

        info!(execution_id, resume_from = ?resume_from, "opening execution stream");
        self.http.get_stream(&url, &headers).await.map_err(stream_error)
    }

    async fn get_execution_status(
        &self,
        execution_id: &str,
    ) -> Result<ExecutionStatus, StreamError> {
        validate_execution_id(execution_id)?;

        let url = self.execution_url(execution_id);
        let mut headers = self.base_headers();
        headers.insert("Accept".to_string(), "application/json".to_string());

        let response = self
            .http
            .get(&url, &headers)
            .await
            .map_err(|e| StreamError::StatusLookup {
                message: e.to_string(),
            })?;

        if !response.is_success() {
            return Err(StreamError::StatusLookup {
                message: format!(
                    "API error (status {}): {}",
                    response.status,
                    String::from_utf8_lossy(&response.body)
                ),
            });
        }

        let execution = decode_execution(&response.body)
            .map_err(|e| StreamError::StatusLookup {
                message: format!("failed to parse response: {}", e),
            })?
            .ok_or_else(|| StreamError::StatusLookup {
                message: format!("execution not found: {}", execution_id),
            })?;

        debug!(
            execution_id,
            found = execution.id(),
            status = %execution.status,
            error = ?execution.error_message,
            "execution status lookup"
        );
        Ok(execution.status)
    }
}

#[async_trait]
impl<C: HttpClient> PlanBackend for ControlPlaneClient<C> {
    async fn open_plan_stream(&self, request: &Value) -> Result<ByteStream, StreamError> {
        let url = self.plan_stream_url();
        let mut headers = self.stream_headers();
        headers.insert("Content-Type".to_string(), "application/json".to_string());

        let body = request.to_string();
        info!(url = %url, "opening plan stream");
        self.http
            .post_stream(&url, &body, &headers)
            .await
            .map_err(stream_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{MockHttpClient, MockResponse};
    use crate::traits::Response;
    use bytes::Bytes;

    const BASE: &str = "https://cp.test";

    fn client() -> ControlPlaneClient<MockHttpClient> {
        ControlPlaneClient::with_http(format!("{}/", BASE), MockHttpClient::new())
            .with_auth("key-1")
    }

    #[test]
    fn test_urls_strip_trailing_slash() {
        let client = client();
        assert_eq!(client.base_url, BASE);
        assert_eq!(
            client.stream_url("exec-1"),
            "https://cp.test/api/v1/executions/exec-1/stream"
        );
        assert_eq!(
            client.execution_url("exec-1"),
            "https://cp.test/api/v1/executions/exec-1"
        );
        assert_eq!(client.plan_stream_url(), "https://cp.test/api/v1/tasks/plan/stream");
    }

    #[tokio::test]
    async fn test_open_stream_headers() {
        let client = client();
        let url = client.stream_url("exec-1");
        client.http().set_response(&url, MockResponse::sse("event: done\ndata: {}\n\n"));

        client.open_stream("exec-1", None).await.unwrap();
        client.open_stream("exec-1", Some("exec-1_2")).await.unwrap();

        let requests = client.http().requests_to(&url);
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].header("accept"), Some("text/event-stream"));
        assert_eq!(requests[0].header("cache-control"), Some("no-cache"));
        assert_eq!(requests[0].header("authorization"), Some("Bearer key-1"));
        assert_eq!(requests[0].header(LAST_EVENT_ID_HEADER), None);
        assert_eq!(requests[1].header(LAST_EVENT_ID_HEADER), Some("exec-1_2"));
    }

    #[tokio::test]
    async fn test_open_stream_status_error() {
        let client = client();
        let url = client.stream_url("exec-1");
        client.http().set_response(
            &url,
            MockResponse::Success(Response::new(404, Bytes::from("no such execution"))),
        );

        match client.open_stream("exec-1", None).await {
            Err(StreamError::HttpStatus { status, message }) => {
                assert_eq!(status, 404);
                assert_eq!(message, "no such execution");
            }
            _ => panic!("expected HttpStatus"),
        }
    }

    #[tokio::test]
    async fn test_invalid_execution_id() {
        let client = client();
        assert!(matches!(
            client.open_stream("", None).await,
            Err(StreamError::InvalidExecutionId { .. })
        ));
        assert!(matches!(
            client.get_execution_status("a/b").await,
            Err(StreamError::InvalidExecutionId { .. })
        ));
        assert!(client.http().get_requests().is_empty());
    }

    #[tokio::test]
    async fn test_status_lookup_shapes() {
        let client = client();
        let url = client.execution_url("exec-1");

        client
            .http()
            .set_response(&url, MockResponse::json(r#"{"id":"exec-1","status":"RUNNING"}"#));
        assert_eq!(
            client.get_execution_status("exec-1").await.unwrap(),
            ExecutionStatus::Running
        );

        client
            .http()
            .set_response(&url, MockResponse::json(r#"[{"id":"exec-1","status":"completed"}]"#));
        assert_eq!(
            client.get_execution_status("exec-1").await.unwrap(),
            ExecutionStatus::Completed
        );

        client.http().set_response(&url, MockResponse::json("[]"));
        assert!(matches!(
            client.get_execution_status("exec-1").await,
            Err(StreamError::StatusLookup { .. })
        ));
    }

    #[tokio::test]
    async fn test_status_lookup_http_failure() {
        let client = client();
        let url = client.execution_url("exec-1");
        client.http().set_response(
            &url,
            MockResponse::Success(Response::new(500, Bytes::from("boom"))),
        );

        match client.get_execution_status("exec-1").await {
            Err(StreamError::StatusLookup { message }) => assert!(message.contains("500")),
            _ => panic!("expected StatusLookup"),
        }
    }

    #[tokio::test]
    async fn test_plan_stream_posts_body() {
        let client = client();
        let url = client.plan_stream_url();
        client.http().set_response(&url, MockResponse::sse("data: [DONE]\n"));

        let request = serde_json::json!({"description": "deploy the api"});
        client.open_plan_stream(&request).await.unwrap();

        let requests = client.http().requests_to(&url);
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].header("content-type"), Some("application/json"));
        assert_eq!(
            requests[0].body.as_deref(),
            Some(r#"{"description":"deploy the api"}"#)
        );
    }
}
