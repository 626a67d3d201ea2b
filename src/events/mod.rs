//! Unified execution event model.
//!
//! Every wire shape (execution channel, planning channel, synthesized
//! controller events) is normalized into [`UnifiedEvent`] before it reaches
//! the filter pipeline and the renderers.

mod fields;

pub use fields::Fields;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Metadata key holding the originating SSE frame id.
pub const META_EVENT_ID: &str = "event_id";
/// Metadata key holding the wire event name for events without a typed mapping.
pub const META_EVENT_TYPE: &str = "event_type";
/// Metadata key holding the wire payload of an unrecognized event.
pub const META_DATA: &str = "data";

/// Closed set of unified event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Connected,
    Message,
    MessageChunk,
    ToolStarted,
    ToolCompleted,
    Status,
    Progress,
    Error,
    Done,
    Unknown,
}

impl EventType {
    pub const ALL: [EventType; 10] = [
        EventType::Connected,
        EventType::Message,
        EventType::MessageChunk,
        EventType::ToolStarted,
        EventType::ToolCompleted,
        EventType::Status,
        EventType::Progress,
        EventType::Error,
        EventType::Done,
        EventType::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Connected => "connected",
            EventType::Message => "message",
            EventType::MessageChunk => "message_chunk",
            EventType::ToolStarted => "tool_started",
            EventType::ToolCompleted => "tool_completed",
            EventType::Status => "status",
            EventType::Progress => "progress",
            EventType::Error => "error",
            EventType::Done => "done",
            EventType::Unknown => "unknown",
        }
    }

    /// Terminal events end the stream for their execution.
    pub fn is_terminal(&self) -> bool {
        matches!(self, EventType::Done | EventType::Error)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        EventType::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| format!("unknown event type: {}", s))
    }
}

/// Tool call lifecycle data.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ToolEvent {
    pub name: String,
    /// Omitted in non-verbose output.
    #[serde(skip_serializing_if = "Fields::is_empty")]
    pub inputs: Fields,
    /// Omitted in non-verbose output.
    #[serde(skip_serializing_if = "Fields::is_empty")]
    pub outputs: Fields,
    pub duration_seconds: f64,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolEvent {
    /// Drop inputs/outputs, keeping name, duration, success and error.
    pub fn strip_io(&mut self) {
        self.inputs.clear();
        self.outputs.clear();
    }
}

/// Message or streamed message chunk.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MessageEvent {
    pub role: String,
    pub content: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub chunk: bool,
}

/// Execution state change.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatusEvent {
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Planning or execution progress.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProgressEvent {
    pub stage: String,
    pub message: String,
    /// Always within 0..=100.
    pub percent: u8,
}

/// Error reported by the backend or synthesized by the client.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ErrorEvent {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub recoverable: bool,
}

/// Typed payload. Serialized under the variant's key (`tool`, `message`, ...).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Payload {
    Tool(ToolEvent),
    Message(MessageEvent),
    Status(StatusEvent),
    Progress(ProgressEvent),
    Error(ErrorEvent),
}

/// The single event representation passed through the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnifiedEvent {
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Unset only between the mapper and the timestamp filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_id: Option<String>,
    #[serde(flatten)]
    pub payload: Option<Payload>,
    #[serde(skip_serializing_if = "Fields::is_empty")]
    pub metadata: Fields,
}

impl UnifiedEvent {
    pub fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            timestamp: None,
            execution_id: None,
            payload: None,
            metadata: Fields::new(),
        }
    }

    fn with_payload(event_type: EventType, payload: Payload) -> Self {
        let mut event = Self::new(event_type);
        event.payload = Some(payload);
        event
    }

    pub fn connected(execution_id: impl Into<String>) -> Self {
        let mut event = Self::new(EventType::Connected);
        let id = execution_id.into();
        if !id.is_empty() {
            event.execution_id = Some(id);
        }
        event
    }

    pub fn tool_started(name: impl Into<String>, inputs: Fields) -> Self {
        Self::with_payload(
            EventType::ToolStarted,
            Payload::Tool(ToolEvent {
                name: name.into(),
                inputs,
                ..ToolEvent::default()
            }),
        )
    }

    pub fn tool_completed(tool: ToolEvent) -> Self {
        Self::with_payload(EventType::ToolCompleted, Payload::Tool(tool))
    }

    pub fn message(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self::with_payload(
            EventType::Message,
            Payload::Message(MessageEvent {
                role: role.into(),
                content: content.into(),
                chunk: false,
            }),
        )
    }

    pub fn message_chunk(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self::with_payload(
            EventType::MessageChunk,
            Payload::Message(MessageEvent {
                role: role.into(),
                content: content.into(),
                chunk: true,
            }),
        )
    }

    pub fn status(state: impl Into<String>) -> Self {
        Self::with_payload(
            EventType::Status,
            Payload::Status(StatusEvent {
                state: state.into(),
                ..StatusEvent::default()
            }),
        )
    }

    /// `percent` is clamped to 100.
    pub fn progress(stage: impl Into<String>, message: impl Into<String>, percent: u8) -> Self {
        Self::with_payload(
            EventType::Progress,
            Payload::Progress(ProgressEvent {
                stage: stage.into(),
                message: message.into(),
                percent: percent.min(100),
            }),
        )
    }

    pub fn error(message: impl Into<String>, code: Option<String>, recoverable: bool) -> Self {
        Self::with_payload(
            EventType::Error,
            Payload::Error(ErrorEvent {
                message: message.into(),
                code,
                recoverable,
            }),
        )
    }

    pub fn done() -> Self {
        Self::new(EventType::Done)
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_execution_id(mut self, execution_id: impl Into<String>) -> Self {
        self.execution_id = Some(execution_id.into());
        self
    }

    pub fn is_terminal(&self) -> bool {
        self.event_type.is_terminal()
    }

    pub fn tool(&self) -> Option<&ToolEvent> {
        match &self.payload {
            Some(Payload::Tool(tool)) => Some(tool),
            _ => None,
        }
    }

    pub fn tool_mut(&mut self) -> Option<&mut ToolEvent> {
        match &mut self.payload {
            Some(Payload::Tool(tool)) => Some(tool),
            _ => None,
        }
    }

    pub fn message_payload(&self) -> Option<&MessageEvent> {
        match &self.payload {
            Some(Payload::Message(message)) => Some(message),
            _ => None,
        }
    }

    pub fn status_payload(&self) -> Option<&StatusEvent> {
        match &self.payload {
            Some(Payload::Status(status)) => Some(status),
            _ => None,
        }
    }

    pub fn status_payload_mut(&mut self) -> Option<&mut StatusEvent> {
        match &mut self.payload {
            Some(Payload::Status(status)) => Some(status),
            _ => None,
        }
    }

    pub fn progress_payload(&self) -> Option<&ProgressEvent> {
        match &self.payload {
            Some(Payload::Progress(progress)) => Some(progress),
            _ => None,
        }
    }

    pub fn error_payload(&self) -> Option<&ErrorEvent> {
        match &self.payload {
            Some(Payload::Error(error)) => Some(error),
            _ => None,
        }
    }

    /// Originating SSE frame id, if the event came off the wire.
    pub fn event_id(&self) -> Option<&str> {
        self.metadata.get_str(META_EVENT_ID)
    }

    /// Wire event name kept for events without a typed mapping.
    pub fn wire_type(&self) -> Option<&str> {
        self.metadata.get_str(META_EVENT_TYPE)
    }
}
