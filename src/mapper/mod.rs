//! Event mappers: raw SSE frames to [`UnifiedEvent`].
//!
//! Two upstream channels speak different dialects. Both mappers produce the
//! same event schema, so the pipeline and renderers never learn where an
//! event came from. Mapping never fails: malformed payloads degrade to a
//! best-effort event.

mod execution;
mod plan;

pub use execution::ExecutionEventMapper;
pub use plan::PlanEventMapper;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::events::{UnifiedEvent, META_EVENT_ID};
use crate::sse::RawFrame;

/// Content locations tried, in order, when a payload may carry text in any of
/// its historical shapes.
pub const CONTENT_PATHS: &[&[&str]] = &[
    &["data", "content"],
    &["message", "content"],
    &["content"],
];

/// Converts one frame into a [`UnifiedEvent`].
pub trait EventMapper: Send + Sync {
    /// Map an event name, optional frame id and raw payload text.
    fn map(&self, event_name: &str, frame_id: Option<&str>, data: &str) -> UnifiedEvent;

    fn map_frame(&self, frame: &RawFrame) -> UnifiedEvent {
        self.map(frame.event_name(), frame.id.as_deref(), &frame.data)
    }
}

/// Follow a path of object keys into a JSON value.
pub fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, key| current.get(*key))
}

/// String at `path`, if present and a string.
pub fn str_at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    lookup(value, path).and_then(Value::as_str)
}

/// First non-empty string found at any of `paths`, tried in order.
pub fn first_non_empty(value: &Value, paths: &[&[&str]]) -> Option<String> {
    paths
        .iter()
        .filter_map(|path| str_at(value, path))
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// Parse a top-level `timestamp` as RFC 3339 text or integer epoch milliseconds.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value.get("timestamp")? {
        Value::String(text) => DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|ts| ts.with_timezone(&Utc)),
        Value::Number(n) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    }
}

/// Parse a payload as a JSON object. Empty payloads count as `{}`.
pub(crate) fn parse_object(data: &str) -> Option<Value> {
    let trimmed = data.trim();
    if trimmed.is_empty() {
        return Some(Value::Object(serde_json::Map::new()));
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(value @ Value::Object(_)) => Some(value),
        _ => None,
    }
}

/// Attach the frame id and wire timestamp shared by both channels.
pub(crate) fn finish(
    mut event: UnifiedEvent,
    frame_id: Option<&str>,
    payload: Option<&Value>,
) -> UnifiedEvent {
    if let Some(ts) = payload.and_then(parse_timestamp) {
        event.timestamp = Some(ts);
    }
    if let Some(id) = frame_id.filter(|id| !id.is_empty()) {
        event.metadata.insert(META_EVENT_ID, id);
    }
    event
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_non_empty_order() {
        let payload = json!({
            "data": {"content": ""},
            "message": {"content": "from message"},
            "content": "top level"
        });
        assert_eq!(
            first_non_empty(&payload, CONTENT_PATHS).as_deref(),
            Some("from message")
        );

        let nested = json!({"data": {"content": "nested"}, "content": "top level"});
        assert_eq!(first_non_empty(&nested, CONTENT_PATHS).as_deref(), Some("nested"));

        let missing = json!({"data": {"content": 5}});
        assert_eq!(first_non_empty(&missing, CONTENT_PATHS), None);
    }

    #[test]
    fn test_lookup_through_non_objects() {
        let payload = json!({"data": "flat"});
        assert!(lookup(&payload, &["data", "content"]).is_none());
        assert_eq!(str_at(&payload, &["data"]), Some("flat"));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let rfc = json!({"timestamp": "2024-05-01T12:00:00Z"});
        assert_eq!(
            parse_timestamp(&rfc),
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
        );

        let millis = json!({"timestamp": 1_714_564_800_000_i64});
        assert_eq!(
            parse_timestamp(&millis),
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
        );

        assert_eq!(parse_timestamp(&json!({"timestamp": "yesterday"})), None);
        assert_eq!(parse_timestamp(&json!({})), None);
    }

    #[test]
    fn test_parse_object() {
        assert!(parse_object("").is_some());
        assert!(parse_object(r#"{"a":1}"#).is_some());
        assert!(parse_object("[1,2]").is_none());
        assert!(parse_object("not json").is_none());
    }
}
