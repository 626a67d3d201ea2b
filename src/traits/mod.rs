//! Trait abstractions for dependency injection and testability.
//!
//! # Traits
//!
//! - [`HttpClient`] - HTTP transport (GET, streaming GET, streaming POST)
//! - [`ExecutionBackend`] - execution stream and status lookup
//! - [`PlanBackend`] - planning stream

pub mod backend;
pub mod http;

pub use backend::{ExecutionBackend, PlanBackend};
pub use http::{ByteStream, Headers, HttpClient, HttpError, Response};
