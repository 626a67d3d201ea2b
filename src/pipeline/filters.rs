//! Standard event filters.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use super::EventFilter;
use crate::events::{EventType, UnifiedEvent};

/// Strips tool inputs/outputs unless verbose.
#[derive(Debug, Clone, Copy)]
pub struct VerbosityFilter {
    verbose: bool,
}

impl VerbosityFilter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl EventFilter for VerbosityFilter {
    fn name(&self) -> &'static str {
        "verbosity"
    }

    fn apply(&mut self, mut event: UnifiedEvent) -> Option<UnifiedEvent> {
        if !self.verbose {
            if let Some(tool) = event.tool_mut() {
                tool.strip_io();
            }
        }
        Some(event)
    }
}

/// Drops a status event that repeats the immediately preceding event's
/// (type, state). Every other event passes and becomes the new "previous".
#[derive(Debug, Default)]
pub struct DedupFilter {
    last: Option<(EventType, Option<String>)>,
}

impl DedupFilter {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(event: &UnifiedEvent) -> (EventType, Option<String>) {
        let state = event.status_payload().map(|s| s.state.clone());
        (event.event_type, state)
    }
}

impl EventFilter for DedupFilter {
    fn name(&self) -> &'static str {
        "dedup"
    }

    fn apply(&mut self, event: UnifiedEvent) -> Option<UnifiedEvent> {
        let key = Self::key(&event);
        if event.event_type == EventType::Status && self.last.as_ref() == Some(&key) {
            return None;
        }
        self.last = Some(key);
        Some(event)
    }
}

type Clock = Box<dyn Fn() -> DateTime<Utc> + Send>;

/// Stamps events that arrived without a timestamp.
pub struct TimestampFilter {
    clock: Clock,
}

impl TimestampFilter {
    pub fn new() -> Self {
        Self::with_clock(Utc::now)
    }

    pub fn with_clock(clock: impl Fn() -> DateTime<Utc> + Send + 'static) -> Self {
        Self {
            clock: Box::new(clock),
        }
    }
}

impl Default for TimestampFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl EventFilter for TimestampFilter {
    fn name(&self) -> &'static str {
        "timestamp"
    }

    fn apply(&mut self, mut event: UnifiedEvent) -> Option<UnifiedEvent> {
        if event.timestamp.is_none() {
            event.timestamp = Some((self.clock)());
        }
        Some(event)
    }
}

/// Allow-list by event type. An empty list allows everything.
#[derive(Debug, Clone, Default)]
pub struct EventTypeFilter {
    allowed: HashSet<EventType>,
}

impl EventTypeFilter {
    pub fn new(allowed: impl IntoIterator<Item = EventType>) -> Self {
        Self {
            allowed: allowed.into_iter().collect(),
        }
    }
}

impl EventFilter for EventTypeFilter {
    fn name(&self) -> &'static str {
        "event_type"
    }

    fn apply(&mut self, event: UnifiedEvent) -> Option<UnifiedEvent> {
        if self.allowed.is_empty() || self.allowed.contains(&event.event_type) {
            Some(event)
        } else {
            None
        }
    }
}

/// Drops events the mapper tagged as keep-alives.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepaliveFilter;

impl EventFilter for KeepaliveFilter {
    fn name(&self) -> &'static str {
        "keepalive"
    }

    fn apply(&mut self, event: UnifiedEvent) -> Option<UnifiedEvent> {
        if event.event_type == EventType::Unknown && event.wire_type() == Some("keepalive") {
            None
        } else {
            Some(event)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{Fields, ToolEvent, META_EVENT_TYPE};
    use chrono::TimeZone;
    use serde_json::json;

    fn tool_completed() -> UnifiedEvent {
        UnifiedEvent::tool_completed(ToolEvent {
            name: "shell".to_string(),
            inputs: Fields::from_value(json!({"command": "ls"})),
            outputs: Fields::from_value(json!({"stdout": "a\nb"})),
            duration_seconds: 0.4,
            success: true,
            error: None,
        })
    }

    #[test]
    fn test_verbosity_strips_io() {
        let mut filter = VerbosityFilter::new(false);
        let event = filter.apply(tool_completed()).unwrap();

        let line = serde_json::to_value(&event).unwrap();
        let tool = &line["tool"];
        assert!(tool.get("inputs").is_none());
        assert!(tool.get("outputs").is_none());
        assert_eq!(tool["name"], "shell");
        assert_eq!(tool["success"], true);
        assert_eq!(tool["duration_seconds"], 0.4);
    }

    #[test]
    fn test_verbosity_keeps_io_when_verbose() {
        let mut filter = VerbosityFilter::new(true);
        let event = filter.apply(tool_completed()).unwrap();
        assert!(!event.tool().unwrap().inputs.is_empty());
        assert!(!event.tool().unwrap().outputs.is_empty());
    }

    #[test]
    fn test_dedup_consecutive_status() {
        let mut filter = DedupFilter::new();
        assert!(filter.apply(UnifiedEvent::status("running")).is_some());
        assert!(filter.apply(UnifiedEvent::status("running")).is_none());
        assert!(filter.apply(UnifiedEvent::status("completed")).is_some());
    }

    #[test]
    fn test_dedup_only_adjacent() {
        let mut filter = DedupFilter::new();
        assert!(filter.apply(UnifiedEvent::status("running")).is_some());
        assert!(filter.apply(UnifiedEvent::message("assistant", "hi")).is_some());
        assert!(filter.apply(UnifiedEvent::status("running")).is_some());
    }

    #[test]
    fn test_dedup_never_drops_other_types() {
        let mut filter = DedupFilter::new();
        for _ in 0..3 {
            assert!(filter
                .apply(UnifiedEvent::message_chunk("assistant", "same"))
                .is_some());
        }
    }

    #[test]
    fn test_timestamp_fills_missing() {
        let fixed = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        let mut filter = TimestampFilter::with_clock(move || fixed);

        let stamped = filter.apply(UnifiedEvent::done()).unwrap();
        assert_eq!(stamped.timestamp, Some(fixed));

        let original = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let kept = filter
            .apply(UnifiedEvent::done().with_timestamp(original))
            .unwrap();
        assert_eq!(kept.timestamp, Some(original));
    }

    #[test]
    fn test_event_type_allow_list() {
        let mut everything = EventTypeFilter::default();
        assert!(everything.apply(UnifiedEvent::done()).is_some());

        let mut only_tools =
            EventTypeFilter::new([EventType::ToolStarted, EventType::ToolCompleted]);
        assert!(only_tools.apply(tool_completed()).is_some());
        assert!(only_tools.apply(UnifiedEvent::status("running")).is_none());
    }

    #[test]
    fn test_keepalive_dropped() {
        let mut filter = KeepaliveFilter;
        let mut keepalive = UnifiedEvent::new(EventType::Unknown);
        keepalive.metadata.insert(META_EVENT_TYPE, "keepalive");
        assert!(filter.apply(keepalive).is_none());

        let mut other = UnifiedEvent::new(EventType::Unknown);
        other.metadata.insert(META_EVENT_TYPE, "cost_update");
        assert!(filter.apply(other).is_some());
    }
}
