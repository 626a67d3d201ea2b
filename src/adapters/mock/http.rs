//! Mock HTTP client for testing.
//!
//! Responses are scripted per URL as a queue: each request takes the next
//! scripted response, and the last one keeps answering once the queue is
//! down to a single entry. That makes "first connection drops, second one
//! finishes" scenarios easy to set up.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::traits::{ByteStream, Headers, HttpClient, HttpError, Response};

/// A recorded HTTP request for verification in tests.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP method (GET or POST)
    pub method: String,
    /// Request URL
    pub url: String,
    /// Request headers
    pub headers: Headers,
    /// Request body (for POST requests)
    pub body: Option<String>,
}

impl RecordedRequest {
    /// Header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Configuration for a mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return a buffered response
    Success(Response),
    /// Fail before any response arrives
    Error(HttpError),
    /// Return a stream of chunks followed by a clean end of stream
    Stream(Vec<Bytes>),
    /// Return a stream of chunks followed by a read error
    StreamError(Vec<Bytes>, HttpError),
    /// Return a stream of chunks that then stays open forever
    Pending(Vec<Bytes>),
}

impl MockResponse {
    /// Stream a complete SSE transcript as one chunk.
    pub fn sse(text: &str) -> Self {
        MockResponse::Stream(vec![Bytes::from(text.to_string())])
    }

    /// Buffered JSON body with status 200.
    pub fn json(body: &str) -> Self {
        MockResponse::Success(Response::new(200, Bytes::from(body.to_string())))
    }
}

/// Mock HTTP client for testing.
///
/// # Example
///
/// ```ignore
/// use execstream::adapters::mock::{MockHttpClient, MockResponse};
///
/// let client = MockHttpClient::new();
/// client.push_response(
///     "https://cp.example.com/api/v1/executions/exec-1/stream",
///     MockResponse::sse("event: done\ndata: {}\n\n"),
/// );
///
/// let requests = client.get_requests();
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockHttpClient {
    /// Scripted responses by exact URL
    responses: Arc<Mutex<HashMap<String, VecDeque<MockResponse>>>>,
    /// Default response when no specific match
    default_response: Arc<Mutex<Option<MockResponse>>>,
    /// Recorded requests for verification
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockHttpClient {
    /// Create a new mock HTTP client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the script for `url` with a single response.
    pub fn set_response(&self, url: &str, response: MockResponse) {
        lock(&self.responses).insert(url.to_string(), VecDeque::from([response]));
    }

    /// Append a response to the script for `url`.
    pub fn push_response(&self, url: &str, response: MockResponse) {
        lock(&self.responses)
            .entry(url.to_string())
            .or_default()
            .push_back(response);
    }

    /// Set a default response for URLs without a script.
    pub fn set_default_response(&self, response: MockResponse) {
        *lock(&self.default_response) = Some(response);
    }

    /// Get all recorded requests.
    pub fn get_requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    /// Recorded requests for one URL, in order.
    pub fn requests_to(&self, url: &str) -> Vec<RecordedRequest> {
        lock(&self.requests)
            .iter()
            .filter(|r| r.url == url)
            .cloned()
            .collect()
    }

    /// Clear all recorded requests.
    pub fn clear_requests(&self) {
        lock(&self.requests).clear();
    }

    fn record_request(&self, method: &str, url: &str, headers: &Headers, body: Option<String>) {
        lock(&self.requests).push(RecordedRequest {
            method: method.to_string(),
            url: url.to_string(),
            headers: headers.clone(),
            body,
        });
    }

    /// Take the next scripted response for a URL.
    fn next_response(&self, url: &str) -> Option<MockResponse> {
        let mut responses = lock(&self.responses);
        if let Some(queue) = responses.get_mut(url) {
            let response = if queue.len() > 1 {
                queue.pop_front()
            } else {
                queue.front().cloned()
            };
            if response.is_some() {
                return response;
            }
        }
        drop(responses);

        lock(&self.default_response).clone()
    }

    fn into_stream(url: &str, response: Option<MockResponse>) -> Result<ByteStream, HttpError> {
        use futures::stream::{self, StreamExt};

        match response {
            Some(MockResponse::Stream(chunks)) => Ok(Box::pin(stream::iter(
                chunks.into_iter().map(Ok::<_, HttpError>),
            ))),
            Some(MockResponse::StreamError(chunks, err)) => Ok(Box::pin(
                stream::iter(chunks.into_iter().map(Ok))
                    .chain(stream::once(async move { Err(err) })),
            )),
            Some(MockResponse::Pending(chunks)) => Ok(Box::pin(
                stream::iter(chunks.into_iter().map(Ok::<_, HttpError>)).chain(stream::pending()),
            )),
            Some(MockResponse::Success(response)) if response.is_success() => {
                Ok(Box::pin(stream::iter(vec![Ok(response.body)])))
            }
            Some(MockResponse::Success(response)) => Err(HttpError::ServerError {
                status: response.status,
                message: response.text().unwrap_or_default(),
            }),
            Some(MockResponse::Error(err)) => Err(err),
            None => Err(HttpError::Other(format!("No mock response for URL: {}", url))),
        }
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn get(&self, url: &str, headers: &Headers) -> Result<Response, HttpError> {
        self.record_request("GET", url, headers, None);

        match self.next_response(url) {
            Some(MockResponse::Success(response)) => Ok(response),
            Some(MockResponse::Error(err)) | Some(MockResponse::StreamError(_, err)) => Err(err),
            Some(MockResponse::Stream(_)) | Some(MockResponse::Pending(_)) => {
                Err(HttpError::Other("Stream response on non-stream request".to_string()))
            }
            None => Err(HttpError::Other(format!("No mock response for URL: {}", url))),
        }
    }

    async fn get_stream(&self, url: &str, headers: &Headers) -> Result<ByteStream, HttpError> {
        self.record_request("GET", url, headers, None);
        Self::into_stream(url, self.next_response(url))
    }

    async fn post_stream(
        &self,
        url: &str,
        body: &str,
        headers: &Headers,
    ) -> Result<ByteStream, HttpError> {
        self.record_request("POST", url, headers, Some(body.to_string()));
        Self::into_stream(url, self.next_response(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    async fn collect(mut stream: ByteStream) -> Vec<Result<Bytes, HttpError>> {
        let mut items = Vec::new();
        while let Some(item) = stream.next().await {
            items.push(item);
        }
        items
    }

    #[tokio::test]
    async fn test_get_with_response() {
        let client = MockHttpClient::new();
        client.set_response("https://example.com/test", MockResponse::json(r#"{"ok":true}"#));

        let response = client
            .get("https://example.com/test", &Headers::new())
            .await
            .unwrap();

        assert_eq!(response.status, 200);

        let requests = client.get_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "GET");
        assert_eq!(requests[0].url, "https://example.com/test");
    }

    #[tokio::test]
    async fn test_queue_then_sticky_last() {
        let client = MockHttpClient::new();
        let url = "https://example.com/stream";
        client.push_response(url, MockResponse::Stream(vec![Bytes::from("first")]));
        client.push_response(url, MockResponse::Stream(vec![Bytes::from("second")]));

        for expected in ["first", "second", "second"] {
            let stream = client.get_stream(url, &Headers::new()).await.unwrap();
            let chunks = collect(stream).await;
            assert_eq!(chunks, vec![Ok(Bytes::from(expected))]);
        }
        assert_eq!(client.requests_to(url).len(), 3);
    }

    #[tokio::test]
    async fn test_stream_error_after_chunks() {
        let client = MockHttpClient::new();
        let url = "https://example.com/stream";
        client.set_response(
            url,
            MockResponse::StreamError(
                vec![Bytes::from("a")],
                HttpError::Io("reset".to_string()),
            ),
        );

        let chunks = collect(client.get_stream(url, &Headers::new()).await.unwrap()).await;
        assert_eq!(
            chunks,
            vec![Ok(Bytes::from("a")), Err(HttpError::Io("reset".to_string()))]
        );
    }

    #[tokio::test]
    async fn test_non_success_status_on_stream() {
        let client = MockHttpClient::new();
        let url = "https://example.com/stream";
        client.set_response(
            url,
            MockResponse::Success(Response::new(404, Bytes::from("not found"))),
        );

        match client.get_stream(url, &Headers::new()).await {
            Err(HttpError::ServerError { status, message }) => {
                assert_eq!(status, 404);
                assert_eq!(message, "not found");
            }
            _ => panic!("Expected ServerError"),
        }
    }

    #[tokio::test]
    async fn test_no_response_configured() {
        let client = MockHttpClient::new();
        let result = client
            .get("https://example.com/missing", &Headers::new())
            .await;
        assert!(matches!(result, Err(HttpError::Other(_))));
    }

    #[tokio::test]
    async fn test_default_response() {
        let client = MockHttpClient::new();
        client.set_default_response(MockResponse::Success(Response::new(
            404,
            Bytes::from("Not Found"),
        )));

        let response = client
            .get("https://example.com/anything", &Headers::new())
            .await
            .unwrap();
        assert_eq!(response.status, 404);
    }

    #[tokio::test]
    async fn test_post_stream_records_body_and_headers() {
        let client = MockHttpClient::new();
        let url = "https://example.com/plan";
        client.set_response(url, MockResponse::sse("data: [DONE]\n"));

        let mut headers = Headers::new();
        headers.insert("Authorization".to_string(), "Bearer token123".to_string());
        client.post_stream(url, r#"{"prompt":"x"}"#, &headers).await.unwrap();

        let requests = client.get_requests();
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].body.as_deref(), Some(r#"{"prompt":"x"}"#));
        assert_eq!(requests[0].header("authorization"), Some("Bearer token123"));
    }

    #[tokio::test]
    async fn test_clone_shares_state() {
        let client = MockHttpClient::new();
        client.set_response("https://example.com", MockResponse::json("{}"));

        let cloned = client.clone();
        cloned.get("https://example.com", &Headers::new()).await.unwrap();

        assert_eq!(client.get_requests().len(), 1);
        client.clear_requests();
        assert!(cloned.get_requests().is_empty());
    }
}
