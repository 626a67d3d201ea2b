//! Async frame reader over a streaming response body.

use bytes::Bytes;
use futures_util::StreamExt;

use super::frame::{FrameParser, RawFrame};
use crate::traits::{ByteStream, HttpError};

/// Longest line the reader buffers before giving up on the connection.
pub const DEFAULT_MAX_LINE_BYTES: usize = 4 * 1024 * 1024;

/// Result of asking the reader for the next frame.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome {
    Frame(RawFrame),
    /// The server closed the body cleanly. Distinct from a read error.
    EndOfStream,
}

/// Lazily yields [`RawFrame`]s from one connection's byte stream.
///
/// Bytes are buffered until a full line is available, so frames split across
/// network chunks (including multi-byte UTF-8 sequences) decode correctly.
/// A new reader is created for every connection.
pub struct FrameReader {
    stream: ByteStream,
    buffer: Vec<u8>,
    /// Prefix of `buffer` already known to hold no newline.
    scanned: usize,
    max_line: usize,
    parser: FrameParser,
    finished: bool,
}

impl FrameReader {
    pub fn new(stream: ByteStream) -> Self {
        Self {
            stream,
            buffer: Vec::new(),
            scanned: 0,
            max_line: DEFAULT_MAX_LINE_BYTES,
            parser: FrameParser::new(),
            finished: false,
        }
    }

    /// Cap the length of a single line. Longer lines fail the read.
    pub fn with_max_line_len(mut self, max: usize) -> Self {
        self.max_line = max.max(1);
        self
    }

    /// Build a reader over an in-memory transcript.
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        let chunk: Result<Bytes, HttpError> = Ok(bytes.into());
        Self::new(Box::pin(futures::stream::iter(vec![chunk])))
    }

    /// Read until the next frame, end of stream, or a transport error.
    pub async fn next_frame(&mut self) -> Result<ReadOutcome, HttpError> {
        loop {
            while let Some(line) = self.take_line() {
                if let Some(frame) = self.parser.feed_line(&line) {
                    return Ok(ReadOutcome::Frame(frame));
                }
            }

            if self.finished {
                // A final line without a trailing newline still counts
                if !self.buffer.is_empty() {
                    self.scanned = 0;
                    let rest = std::mem::take(&mut self.buffer);
                    let line = decode_line(&rest);
                    if let Some(frame) = self.parser.feed_line(&line) {
                        return Ok(ReadOutcome::Frame(frame));
                    }
                }
                return Ok(ReadOutcome::EndOfStream);
            }

            if self.buffer.len() > self.max_line {
                return Err(HttpError::Io(format!(
                    "stream line exceeds {} bytes",
                    self.max_line
                )));
            }

            match self.stream.next().await {
                Some(Ok(chunk)) => self.buffer.extend_from_slice(&chunk),
                Some(Err(e)) => return Err(e),
                None => self.finished = true,
            }
        }
    }

    fn take_line(&mut self) -> Option<String> {
        let Some(offset) = self.buffer[self.scanned..].iter().position(|b| *b == b'\n') else {
            self.scanned = self.buffer.len();
            return None;
        };
        let newline_pos = self.scanned + offset;
        self.scanned = 0;
        let line: Vec<u8> = self.buffer.drain(..=newline_pos).collect();
        Some(decode_line(&line[..newline_pos]))
    }
}

fn decode_line(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).trim_end_matches('\r').to_string()
}
