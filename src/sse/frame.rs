//! SSE line classification and frame accumulation.

/// One `id` / `event` / `data` triple parsed from the stream.
///
/// Frames never leave the reader/mapper boundary; everything downstream sees
/// [`crate::events::UnifiedEvent`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawFrame {
    /// Opaque resumption token from the most recent `id:` line.
    pub id: Option<String>,
    /// Wire event name from the most recent `event:` line.
    pub event: Option<String>,
    /// Payload of the `data:` line that produced this frame.
    pub data: String,
}

impl RawFrame {
    /// Event name, or the empty string when the frame carried none.
    pub fn event_name(&self) -> &str {
        self.event.as_deref().unwrap_or("")
    }
}

/// Represents a parsed SSE line
#[derive(Debug, Clone, PartialEq)]
pub enum SseLine {
    /// Frame id (e.g., "id: exec-1_4_1702938457123456")
    Id(String),
    /// Event type declaration (e.g., "event: tool_started")
    Event(String),
    /// Data payload (e.g., "data: {\"status\": \"running\"}")
    Data(String),
    /// Empty line - resets accumulation
    Empty,
    /// Comment line (starts with ':'), e.g. keep-alives
    Comment(String),
}

/// Parse a single SSE line into its component type
pub fn parse_sse_line(line: &str) -> SseLine {
    if line.is_empty() {
        return SseLine::Empty;
    }

    if let Some(stripped) = line.strip_prefix(':') {
        return SseLine::Comment(stripped.trim().to_string());
    }

    if let Some(rest) = line.strip_prefix("id:") {
        return SseLine::Id(rest.trim().to_string());
    }

    if let Some(rest) = line.strip_prefix("event:") {
        return SseLine::Event(rest.trim().to_string());
    }

    // Only the single space after the colon belongs to the framing
    if let Some(rest) = line.strip_prefix("data:") {
        let value = rest.strip_prefix(' ').unwrap_or(rest);
        return SseLine::Data(value.to_string());
    }

    // Unknown fields (e.g. "retry:") are treated as comments
    SseLine::Comment(line.to_string())
}

/// Stateful accumulator turning lines into [`RawFrame`]s.
///
/// Each `data:` line emits a frame immediately, combining it with the most
/// recent `id:` and `event:` lines, and then resets the accumulated id and
/// name. A blank line resets without emitting.
#[derive(Debug, Default)]
pub struct FrameParser {
    current_id: Option<String>,
    current_event: Option<String>,
}

impl FrameParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line (without its trailing newline).
    pub fn feed_line(&mut self, line: &str) -> Option<RawFrame> {
        match parse_sse_line(line) {
            SseLine::Id(id) => {
                self.current_id = (!id.is_empty()).then_some(id);
                None
            }
            SseLine::Event(name) => {
                self.current_event = (!name.is_empty()).then_some(name);
                None
            }
            SseLine::Data(data) => Some(RawFrame {
                id: self.current_id.take(),
                event: self.current_event.take(),
                data,
            }),
            SseLine::Empty => {
                self.reset();
                None
            }
            SseLine::Comment(_) => None,
        }
    }

    pub fn reset(&mut self) {
        self.current_id = None;
        self.current_event = None;
    }
}

/// Parse a complete SSE transcript into frames.
pub fn parse_frames(text: &str) -> Vec<RawFrame> {
    let mut parser = FrameParser::new();
    text.lines()
        .filter_map(|line| parser.feed_line(line.trim_end_matches('\r')))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_line() {
        assert_eq!(parse_sse_line(""), SseLine::Empty);
    }

    #[test]
    fn test_parse_comment_line() {
        assert_eq!(
            parse_sse_line(": keepalive"),
            SseLine::Comment("keepalive".to_string())
        );
        assert_eq!(parse_sse_line(":ping"), SseLine::Comment("ping".to_string()));
    }

    #[test]
    fn test_parse_field_lines() {
        assert_eq!(parse_sse_line("id: abc_1"), SseLine::Id("abc_1".to_string()));
        assert_eq!(
            parse_sse_line("event:status"),
            SseLine::Event("status".to_string())
        );
        assert_eq!(
            parse_sse_line("data: {\"x\":1}"),
            SseLine::Data("{\"x\":1}".to_string())
        );
        assert_eq!(
            parse_sse_line("retry: 3000"),
            SseLine::Comment("retry: 3000".to_string())
        );
    }

    #[test]
    fn test_data_value_keeps_inner_whitespace() {
        assert_eq!(
            parse_sse_line("data:   indented output  "),
            SseLine::Data("  indented output  ".to_string())
        );
        assert_eq!(parse_sse_line("data:no space"), SseLine::Data("no space".to_string()));
        assert_eq!(parse_sse_line("data:"), SseLine::Data(String::new()));
    }

    #[test]
    fn test_data_line_emits_with_accumulated_fields() {
        let mut parser = FrameParser::new();
        assert!(parser.feed_line("id: exec-1_1").is_none());
        assert!(parser.feed_line("event: status").is_none());

        let frame = parser.feed_line(r#"data: {"status":"running"}"#).unwrap();
        assert_eq!(frame.id.as_deref(), Some("exec-1_1"));
        assert_eq!(frame.event_name(), "status");
        assert_eq!(frame.data, r#"{"status":"running"}"#);
    }

    #[test]
    fn test_accumulation_resets_after_data() {
        let mut parser = FrameParser::new();
        parser.feed_line("id: 7");
        parser.feed_line("event: message");
        parser.feed_line("data: {}").unwrap();

        let bare = parser.feed_line("data: {}").unwrap();
        assert_eq!(bare.id, None);
        assert_eq!(bare.event, None);
    }

    #[test]
    fn test_blank_line_resets_without_emitting() {
        let mut parser = FrameParser::new();
        parser.feed_line("event: tool_started");
        assert!(parser.feed_line("").is_none());

        let frame = parser.feed_line("data: {}").unwrap();
        assert_eq!(frame.event, None);
    }

    #[test]
    fn test_comments_do_not_disturb_accumulation() {
        let mut parser = FrameParser::new();
        parser.feed_line("event: done");
        parser.feed_line(": keepalive");
        let frame = parser.feed_line("data: {}").unwrap();
        assert_eq!(frame.event_name(), "done");
    }

    #[test]
    fn test_parse_frames_transcript() {
        let text = "event: connected\r\ndata: {\"execution_id\":\"exec-1\"}\r\n\r\n\
                    : ka\n\nid: 2\nevent: done\ndata: {}\n\n";
        let frames = parse_frames(text);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].event_name(), "connected");
        assert_eq!(frames[1].id.as_deref(), Some("2"));
        assert_eq!(frames[1].event_name(), "done");
    }
}
