//! Execstream - resumable execution event streaming.
//!
//! Connects to a control plane's server-sent event stream, normalizes the
//! frames into [`events::UnifiedEvent`]s, survives disconnects by resuming
//! from the last frame id, and renders the result as NDJSON or terminal text.
//!
//! The library is also what the integration tests drive.

pub mod adapters;
pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod executor;
pub mod logging;
pub mod mapper;
pub mod models;
pub mod pipeline;
pub mod render;
pub mod sse;
pub mod stream;
pub mod traits;
