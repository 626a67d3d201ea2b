//! Mapper for the planning channel.

use serde_json::{json, Value};
use tracing::debug;

use super::execution::tagged_unknown;
use super::{finish, first_non_empty, lookup, parse_object, str_at, EventMapper};
use crate::events::{Fields, ToolEvent, UnifiedEvent, META_EVENT_TYPE};

const PLANNER_ROLE: &str = "planner";

/// Maps planning-channel frames.
///
/// The planner names its events on the `event:` line and puts a flat object
/// on the `data:` line. Payloads that are not JSON are wrapped as
/// `{"content": raw}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanEventMapper;

impl PlanEventMapper {
    pub fn new() -> Self {
        Self
    }

    fn map_payload(&self, event_name: &str, data: &Value) -> UnifiedEvent {
        match event_name {
            "progress" => UnifiedEvent::progress(
                str_at(data, &["stage"]).unwrap_or_default(),
                str_at(data, &["message"]).unwrap_or_default(),
                percent_of(data),
            ),
            "thinking" => UnifiedEvent::message_chunk(
                PLANNER_ROLE,
                str_at(data, &["content"]).unwrap_or_default(),
            ),
            "tool_call" => {
                UnifiedEvent::tool_started(tool_name(data), Fields::from_value(data.clone()))
            }
            "tool_result" => UnifiedEvent::tool_completed(ToolEvent {
                name: tool_name(data),
                outputs: Fields::from_value(data.clone()),
                success: true,
                ..ToolEvent::default()
            }),
            "step_started" | "step_running" => UnifiedEvent::progress(
                str_at(data, &["step"]).unwrap_or_default(),
                "Running step",
                0,
            ),
            "step_completed" => UnifiedEvent::progress(
                str_at(data, &["step"]).unwrap_or_default(),
                "Step completed",
                100,
            ),
            "resources_summary" => {
                UnifiedEvent::progress("Resources", "Resource discovery complete", 0)
            }
            "complete" => UnifiedEvent::done(),
            "error" => UnifiedEvent::error(
                first_non_empty(data, &[&["message"], &["error"]]).unwrap_or_default(),
                str_at(data, &["code"]).map(Into::into),
                false,
            ),
            "" => match str_at(data, &["type"]).filter(|t| !t.is_empty()) {
                Some(resolved) => self.map_payload(resolved, data),
                None => unmapped("", data),
            },
            other => unmapped(other, data),
        }
    }
}

impl EventMapper for PlanEventMapper {
    fn map(&self, event_name: &str, frame_id: Option<&str>, data: &str) -> UnifiedEvent {
        debug!(event = event_name, id = ?frame_id, "mapping plan frame");

        let payload = parse_object(data).unwrap_or_else(|| json!({ "content": data }));
        let event = self.map_payload(event_name, &payload);
        finish(event, frame_id, Some(&payload))
    }
}

fn tool_name(data: &Value) -> String {
    str_at(data, &["tool_name"]).unwrap_or_default().to_string()
}

fn percent_of(data: &Value) -> u8 {
    lookup(data, &["progress"])
        .and_then(Value::as_f64)
        .map(|p| p.clamp(0.0, 100.0) as u8)
        .unwrap_or(0)
}

fn unmapped(event_name: &str, data: &Value) -> UnifiedEvent {
    match str_at(data, &["content"]).filter(|c| !c.is_empty()) {
        Some(content) => {
            let mut event = UnifiedEvent::message_chunk(PLANNER_ROLE, content);
            if !event_name.is_empty() {
                event.metadata.insert(META_EVENT_TYPE, event_name);
            }
            event
        }
        None => tagged_unknown(event_name, Some(data)),
    }
}
