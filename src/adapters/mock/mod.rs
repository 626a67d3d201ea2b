//! Mock implementations for testing.
//!
//! Enables unit testing of the stream controller and control plane client
//! without network access.

pub mod http;

pub use http::{MockHttpClient, MockResponse, RecordedRequest};
