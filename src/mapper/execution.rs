//! Mapper for the execution event channel.

use serde_json::Value;
use tracing::{debug, warn};

use super::{finish, first_non_empty, lookup, parse_object, str_at, EventMapper, CONTENT_PATHS};
use crate::events::{EventType, Fields, ToolEvent, UnifiedEvent, META_DATA, META_EVENT_TYPE};

const DEFAULT_ROLE: &str = "assistant";

/// Maps execution-channel frames.
///
/// Tolerates the nested `data.*`, nested `message.*` and flat payload shapes
/// the control plane has emitted over time.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutionEventMapper;

impl ExecutionEventMapper {
    pub fn new() -> Self {
        Self
    }

    fn map_payload(&self, event_name: &str, payload: &Value) -> UnifiedEvent {
        match event_name {
            "connected" => {
                UnifiedEvent::connected(str_at(payload, &["execution_id"]).unwrap_or_default())
            }
            "message" => UnifiedEvent::message(
                role_of(payload),
                str_at(payload, &["content"]).unwrap_or_default(),
            ),
            "message_chunk" => UnifiedEvent::message_chunk(
                role_of(payload),
                first_non_empty(payload, CONTENT_PATHS).unwrap_or_default(),
            ),
            "tool_started" => {
                let inputs = [&["data", "tool_input"][..], &["data", "tool_arguments"][..]]
                    .iter()
                    .find_map(|path| lookup(payload, path).filter(|v| !v.is_null()))
                    .cloned()
                    .map(Fields::from_value)
                    .unwrap_or_default();
                UnifiedEvent::tool_started(tool_name(payload), inputs)
            }
            "tool_completed" => UnifiedEvent::tool_completed(completed_tool(payload)),
            "status" | "history_complete" => {
                let mut event =
                    UnifiedEvent::status(str_at(payload, &["status"]).unwrap_or("unknown"));
                if let Some(status) = event.status_payload_mut() {
                    status.previous_state = str_at(payload, &["previous_state"]).map(Into::into);
                    status.reason = str_at(payload, &["reason"]).map(Into::into);
                }
                event
            }
            "done" => UnifiedEvent::done(),
            "error" => UnifiedEvent::error(
                first_non_empty(payload, &[&["error"], &["error", "message"], &["message"]])
                    .unwrap_or_default(),
                str_at(payload, &["code"]).map(Into::into),
                lookup(payload, &["recoverable"])
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
            ),
            "keepalive" => tagged_unknown("keepalive", None),
            "" => match str_at(payload, &["type"]).filter(|t| !t.is_empty()) {
                Some(resolved) => self.map_payload(resolved, payload),
                None => unmapped("", payload),
            },
            other => unmapped(other, payload),
        }
    }
}

impl EventMapper for ExecutionEventMapper {
    fn map(&self, event_name: &str, frame_id: Option<&str>, data: &str) -> UnifiedEvent {
        debug!(event = event_name, id = ?frame_id, "mapping execution frame");

        let Some(payload) = parse_object(data) else {
            return finish(raw_fallback(event_name, data), frame_id, None);
        };

        let mut event = self.map_payload(event_name, &payload);
        if event.execution_id.is_none() && event.event_type != EventType::Connected {
            if let Some(id) = str_at(&payload, &["execution_id"]).filter(|id| !id.is_empty()) {
                event.execution_id = Some(id.to_string());
            }
        }
        finish(event, frame_id, Some(&payload))
    }
}

fn role_of(payload: &Value) -> String {
    first_non_empty(payload, &[&["message", "role"], &["role"]])
        .unwrap_or_else(|| DEFAULT_ROLE.to_string())
}

fn tool_name(payload: &Value) -> String {
    first_non_empty(payload, &[&["data", "tool_name"], &["metadata", "tool_name"]])
        .unwrap_or_default()
}

fn completed_tool(payload: &Value) -> ToolEvent {
    let outputs = lookup(payload, &["data", "tool_output"])
        .cloned()
        .map(Fields::from_value)
        .unwrap_or_default();

    let success = first_non_empty(payload, &[&["data", "tool_status"], &["data", "status"]])
        .map(|status| matches!(status.as_str(), "completed" | "success"))
        .unwrap_or(true);

    let duration_seconds = [
        &["data", "duration_seconds"][..],
        &["data", "duration"][..],
        &["duration_seconds"][..],
        &["duration"][..],
    ]
    .iter()
    .find_map(|path| lookup(payload, path).and_then(Value::as_f64))
    .unwrap_or(0.0);

    ToolEvent {
        name: tool_name(payload),
        inputs: Fields::new(),
        outputs,
        duration_seconds,
        success,
        error: first_non_empty(payload, &[&["data", "error"], &["error"]]),
    }
}

/// Unknown wire names keep any recoverable text as an assistant chunk.
fn unmapped(event_name: &str, payload: &Value) -> UnifiedEvent {
    match first_non_empty(payload, CONTENT_PATHS) {
        Some(content) => {
            let mut event = UnifiedEvent::message_chunk(DEFAULT_ROLE, content);
            if !event_name.is_empty() {
                event.metadata.insert(META_EVENT_TYPE, event_name);
            }
            event
        }
        None => tagged_unknown(event_name, Some(payload)),
    }
}

pub(super) fn tagged_unknown(event_name: &str, payload: Option<&Value>) -> UnifiedEvent {
    let mut event = UnifiedEvent::new(EventType::Unknown);
    if !event_name.is_empty() {
        event.metadata.insert(META_EVENT_TYPE, event_name);
    }
    if let Some(payload) = payload.filter(|p| p.as_object().is_some_and(|o| !o.is_empty())) {
        event.metadata.insert(META_DATA, payload.clone());
    }
    event
}

fn raw_fallback(event_name: &str, data: &str) -> UnifiedEvent {
    warn!(event = event_name, "execution frame payload is not a JSON object");
    match event_name {
        "done" => UnifiedEvent::done(),
        "error" => UnifiedEvent::error(data, None, false),
        _ => {
            let mut event = UnifiedEvent::message_chunk(DEFAULT_ROLE, data);
            if !event_name.is_empty() {
                event.metadata.insert(META_EVENT_TYPE, event_name);
            }
            event
        }
    }
}
