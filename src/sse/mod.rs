//! SSE (Server-Sent Events) frame reader
//!
//! SSE format consists of:
//! - `id: <token>` - resumption token for the next frame
//! - `event: <type>` - event type line
//! - `data: <json>` - data payload line, emits a frame
//! - Empty line - resets accumulated id / event
//! - Lines starting with `:` - comments such as keep-alives (ignored)
//!
//! # Module structure
//! - `frame` - line classification and the synchronous [`FrameParser`]
//! - `reader` - the async [`FrameReader`] over a response body

mod frame;
mod reader;

pub use frame::{parse_frames, parse_sse_line, FrameParser, RawFrame, SseLine};
pub use reader::{FrameReader, ReadOutcome};
