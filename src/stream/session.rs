//! Per-stream session state owned by the controller task.

use std::cmp::Ordering;
use std::time::Duration;

use tracing::debug;

/// Default reconnect cap. With the default backoff this covers executions
/// that run for many hours.
pub const DEFAULT_MAX_RECONNECTS: u32 = 100;

/// Default fixed delay between reconnect attempts.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Fixed-delay, count-capped reconnection policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_reconnects: u32,
    pub backoff: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_reconnects: DEFAULT_MAX_RECONNECTS,
            backoff: DEFAULT_RECONNECT_DELAY,
        }
    }
}

impl ReconnectPolicy {
    pub fn new(max_reconnects: u32, backoff: Duration) -> Self {
        Self {
            max_reconnects,
            backoff,
        }
    }
}

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Connecting,
    Streaming,
    Disconnected,
    Terminal,
}

impl StreamState {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamState::Connecting => "connecting",
            StreamState::Streaming => "streaming",
            StreamState::Disconnected => "disconnected",
            StreamState::Terminal => "terminal",
        }
    }
}

/// Resumption and retry bookkeeping for one execution stream.
#[derive(Debug, Clone)]
pub struct StreamSession {
    pub last_seen_frame_id: Option<String>,
    pub reconnect_count: u32,
    pub max_reconnects: u32,
    pub backoff_delay: Duration,
    state: StreamState,
}

impl StreamSession {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            last_seen_frame_id: None,
            reconnect_count: 0,
            max_reconnects: policy.max_reconnects,
            backoff_delay: policy.backoff,
            state: StreamState::Connecting,
        }
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn transition(&mut self, next: StreamState) {
        if self.state != next {
            debug!(from = self.state.as_str(), to = next.as_str(), "stream state");
            self.state = next;
        }
    }

    /// Record a frame id seen on the wire.
    ///
    /// Returns `false` for a replayed frame, one whose id is comparable to
    /// and not newer than the last seen id. Such frames must not be emitted
    /// again, and the last seen id is left untouched.
    pub fn observe_frame_id(&mut self, id: Option<&str>) -> bool {
        let Some(id) = id.filter(|id| !id.is_empty()) else {
            return true;
        };

        if let Some(last) = &self.last_seen_frame_id {
            if matches!(compare_frame_ids(id, last), Some(Ordering::Less | Ordering::Equal)) {
                return false;
            }
        }

        self.last_seen_frame_id = Some(id.to_string());
        true
    }

    /// Count a reconnect attempt. Returns `false` once the cap is exceeded.
    pub fn begin_reconnect(&mut self) -> bool {
        self.reconnect_count += 1;
        self.reconnect_count <= self.max_reconnects
    }
}

/// Trailing numeric `_`-separated segments of a frame id.
///
/// `exec-1_4_1702938457123456` yields `[4, 1702938457123456]` and `12`
/// yields `[12]`.
fn numeric_suffix(id: &str) -> Option<(&str, Vec<u64>)> {
    let mut segments: Vec<&str> = id.split('_').collect();
    let mut numbers = Vec::new();
    while let Some(last) = segments.last() {
        match last.parse::<u64>() {
            Ok(n) => {
                numbers.push(n);
                segments.pop();
            }
            Err(_) => break,
        }
    }
    if numbers.is_empty() {
        return None;
    }
    numbers.reverse();
    let prefix_len = segments.iter().map(|s| s.len() + 1).sum::<usize>();
    Some((&id[..prefix_len.min(id.len())], numbers))
}

/// Order two frame ids when they share a prefix and numeric shape.
///
/// Returns `None` when the ids are not comparable.
pub fn compare_frame_ids(a: &str, b: &str) -> Option<Ordering> {
    let (prefix_a, nums_a) = numeric_suffix(a)?;
    let (prefix_b, nums_b) = numeric_suffix(b)?;
    if prefix_a != prefix_b || nums_a.len() != nums_b.len() {
        return None;
    }
    Some(nums_a.cmp(&nums_b))
}
