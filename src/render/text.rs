//! Human-oriented text renderer.

use std::io::Write;
use std::sync::Mutex;
use std::time::Instant;

use crossterm::queue;
use crossterm::style::{Color, Print};
use crossterm::terminal::{Clear, ClearType};
use serde_json::Value;

use super::style::{self, icons, Painter, Tone, SPINNER_CHARS};
use super::{Renderer, DEFAULT_OUTPUT_LINES, VERBOSE_OUTPUT_LINES};
use crate::error::RenderError;
use crate::events::{EventType, Fields, MessageEvent, ToolEvent, UnifiedEvent};

/// Non-verbose message bodies are cut after this many characters.
const MESSAGE_PREVIEW_CHARS: usize = 300;

/// Output lines longer than this are cut.
const OUTPUT_LINE_CHARS: usize = 100;

const COMMAND_PREVIEW_CHARS: usize = 200;
const INPUT_VALUE_CHARS: usize = 80;

/// Text renderer settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextOptions {
    pub verbose: bool,
    /// Tool output line limit. Zero falls back to the default.
    pub output_lines: usize,
    /// Show tool output without a line limit.
    pub full_output: bool,
    /// Only show tool completion lines, no chunks or tool detail.
    pub compact: bool,
    /// Emit color and cursor control sequences.
    pub interactive: bool,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            verbose: false,
            output_lines: DEFAULT_OUTPUT_LINES,
            full_output: false,
            compact: false,
            interactive: false,
        }
    }
}

/// What the cursor is sitting after.
#[derive(Debug, Clone, PartialEq, Eq)]
enum OpenLine {
    None,
    /// Streamed message text for this role.
    Chunk(String),
    /// An interactive `running...` line, replaced on completion.
    ToolRunning,
    /// An interactive progress bar, redrawn in place.
    Progress,
}

struct TextState<W> {
    out: W,
    open: OpenLine,
    spinner_frame: usize,
    active_tool: Option<String>,
}

/// Boxed banners, tool lines and streamed chunks for a terminal or log.
pub struct TextRenderer<W: Write + Send> {
    state: Mutex<TextState<W>>,
    painter: Painter,
    options: TextOptions,
    started: Instant,
}

impl<W: Write + Send> TextRenderer<W> {
    pub fn new(out: W, mut options: TextOptions) -> Self {
        if options.output_lines == 0 {
            options.output_lines = DEFAULT_OUTPUT_LINES;
        }
        Self {
            state: Mutex::new(TextState {
                out,
                open: OpenLine::None,
                spinner_frame: 0,
                active_tool: None,
            }),
            painter: Painter::new(options.interactive),
            options,
            started: Instant::now(),
        }
    }

    pub fn options(&self) -> &TextOptions {
        &self.options
    }

    /// Take back the sink.
    pub fn into_inner(self) -> Result<W, RenderError> {
        self.state
            .into_inner()
            .map(|state| state.out)
            .map_err(|_| RenderError::Poisoned)
    }

    fn output_line_limit(&self) -> usize {
        if self.options.full_output {
            0
        } else if self.options.verbose {
            VERBOSE_OUTPUT_LINES
        } else {
            self.options.output_lines
        }
    }

    /// Terminate whatever line is open so the next write starts clean.
    fn end_line(&self, state: &mut TextState<W>) -> std::io::Result<()> {
        if state.open != OpenLine::None {
            writeln!(state.out)?;
            state.open = OpenLine::None;
        }
        Ok(())
    }

    fn clear_line(&self, state: &mut TextState<W>) -> std::io::Result<()> {
        if self.painter.is_interactive() {
            queue!(state.out, Print("\r"), Clear(ClearType::CurrentLine))?;
        }
        Ok(())
    }

    fn render_connected(
        &self,
        state: &mut TextState<W>,
        event: &UnifiedEvent,
    ) -> std::io::Result<()> {
        self.end_line(state)?;
        self.clear_line(state)?;
        let id: String = event
            .execution_id
            .as_deref()
            .unwrap_or_default()
            .chars()
            .take(11)
            .collect();
        let banner = self
            .painter
            .banner("CONNECTED", &format!("Execution {}", id), Color::Cyan);
        writeln!(state.out, "{}", banner)
    }

    fn render_tool_started(
        &self,
        state: &mut TextState<W>,
        tool: &ToolEvent,
    ) -> std::io::Result<()> {
        state.active_tool = Some(tool.name.clone());
        if self.options.compact {
            return Ok(());
        }
        self.end_line(state)?;

        state.spinner_frame = (state.spinner_frame + 1) % SPINNER_CHARS.len();
        let spinner = SPINNER_CHARS[state.spinner_frame].to_string();
        write!(
            state.out,
            "\n{} {} {} {}",
            self.painter.color(&spinner, Color::Yellow),
            self.painter.color(style::tool_icon(&tool.name), Color::Cyan),
            self.painter
                .paint(&style::clean_tool_name(&tool.name), Some(Color::Cyan), Tone::Bold),
            self.painter.dim("running...")
        )?;

        if tool.inputs.is_empty() && self.painter.is_interactive() {
            state.open = OpenLine::ToolRunning;
            return Ok(());
        }
        writeln!(state.out)?;
        if !tool.inputs.is_empty() {
            self.render_tool_inputs(state, tool)?;
        }
        Ok(())
    }

    fn render_tool_inputs(
        &self,
        state: &mut TextState<W>,
        tool: &ToolEvent,
    ) -> std::io::Result<()> {
        let formatted = format_tool_input(&tool.name, &tool.inputs);
        if !formatted.contains('\n') {
            return writeln!(state.out, "   {}", self.painter.dim(&formatted));
        }
        writeln!(state.out, "{}", self.painter.section_top("Input"))?;
        for line in formatted.split('\n') {
            writeln!(state.out, "{}", self.painter.section_line(&self.painter.dim(line), None))?;
        }
        writeln!(state.out, "{}", self.painter.section_bottom())
    }

    fn render_tool_completed(
        &self,
        state: &mut TextState<W>,
        tool: &ToolEvent,
    ) -> std::io::Result<()> {
        if state.open == OpenLine::ToolRunning {
            self.clear_line(state)?;
            state.open = OpenLine::None;
        } else {
            self.end_line(state)?;
        }

        let (mark, color) = if tool.success {
            (icons::SUCCESS, Color::Green)
        } else {
            (icons::FAILURE, Color::Red)
        };
        let duration = if tool.duration_seconds > 0.0 {
            format!(
                " {}",
                self.painter.dim(&format!("({:.1}s)", tool.duration_seconds))
            )
        } else {
            String::new()
        };
        writeln!(
            state.out,
            "{} {} {}{}",
            self.painter.color(mark, color),
            self.painter.color(style::tool_icon(&tool.name), Color::Cyan),
            self.painter.color(&style::clean_tool_name(&tool.name), Color::Cyan),
            duration
        )?;

        if !self.options.compact && !tool.outputs.is_empty() {
            self.render_tool_outputs(state, tool)?;
        }

        if let Some(error) = tool.error.as_deref().filter(|e| !tool.success && !e.is_empty()) {
            writeln!(
                state.out,
                "  {} {}",
                self.painter.color("└─", Color::Red),
                self.painter.color(error, Color::Red)
            )?;
        }

        state.active_tool = None;
        Ok(())
    }

    fn render_tool_outputs(
        &self,
        state: &mut TextState<W>,
        tool: &ToolEvent,
    ) -> std::io::Result<()> {
        let color = if tool.success { Color::White } else { Color::Red };

        let main_output = tool
            .outputs
            .iter()
            .map(|(_, value)| display_value(value))
            .fold(String::new(), |longest, candidate| {
                if candidate.len() > longest.len() {
                    candidate
                } else {
                    longest
                }
            });
        let (kept, omitted) = style::truncate_lines(&main_output, self.output_line_limit());

        writeln!(state.out, "{}", self.painter.section_top("Output"))?;
        for line in kept.split('\n') {
            let line = style::truncate_chars(line, OUTPUT_LINE_CHARS);
            writeln!(state.out, "{}", self.painter.section_line(&line, Some(color)))?;
        }
        if omitted > 0 {
            let indicator = format!("+{} more lines", omitted);
            writeln!(
                state.out,
                "{}",
                self.painter.section_line(&indicator, Some(Color::Yellow))
            )?;
        }
        writeln!(state.out, "{}", self.painter.section_bottom())
    }

    fn render_chunk(
        &self,
        state: &mut TextState<W>,
        message: &MessageEvent,
    ) -> std::io::Result<()> {
        if message.content.is_empty() || message.content == "(no content)" || self.options.compact {
            return Ok(());
        }

        let continues = matches!(&state.open, OpenLine::Chunk(role) if *role == message.role);
        if !continues {
            self.end_line(state)?;
            let (icon, label) = role_header(&message.role);
            writeln!(state.out)?;
            writeln!(state.out, "{} {}", icon, self.painter.bold(&label))?;
        }

        write!(state.out, "{}", message.content)?;
        state.open = OpenLine::Chunk(message.role.clone());
        Ok(())
    }

    fn render_message(
        &self,
        state: &mut TextState<W>,
        message: &MessageEvent,
    ) -> std::io::Result<()> {
        self.end_line(state)?;

        let content = if !self.options.verbose
            && message.content.chars().count() > MESSAGE_PREVIEW_CHARS
        {
            let mut cut: String = message.content.chars().take(MESSAGE_PREVIEW_CHARS).collect();
            cut.push_str("...");
            cut
        } else {
            message.content.clone()
        };

        match message.role.as_str() {
            "user" | "assistant" | "planner" => {
                let (icon, label) = role_header(&message.role);
                writeln!(state.out, "\n{} {}", icon, self.painter.bold(&label))?;
                if message.role == "user" {
                    writeln!(state.out, "{}", self.painter.dim(&content))
                } else {
                    writeln!(state.out, "{}", content)
                }
            }
            "system" => writeln!(
                state.out,
                "{} {}",
                self.painter.color(icons::INFO, Color::Blue),
                self.painter.dim(&content)
            ),
            "tool" => writeln!(state.out, "{}", self.painter.dim(&content)),
            other => writeln!(state.out, "[{}] {}", other.to_uppercase(), content),
        }
    }

    fn render_status(&self, state: &mut TextState<W>, event: &UnifiedEvent) -> std::io::Result<()> {
        let Some(status) = event.status_payload() else {
            return Ok(());
        };
        self.end_line(state)?;

        let state_name = status.state.to_lowercase();
        let (icon, color) = match state_name.as_str() {
            "unknown" | "running" => return Ok(()),
            "waiting_for_input" | "paused" => {
                writeln!(state.out)?;
                let banner = self
                    .painter
                    .banner("COMPLETE", "Waiting for input", Color::Green);
                return writeln!(state.out, "{}", banner);
            }
            "completed" | "done" => (icons::SUCCESS, Some(Color::Green)),
            "failed" | "error" => (icons::FAILURE, Some(Color::Red)),
            "cancelled" => (icons::CANCELLED, Some(Color::Yellow)),
            _ => (icons::STATE, None),
        };

        let paint = |text: &str| match color {
            Some(color) => self.painter.color(text, color),
            None => self.painter.dim(text),
        };
        let mut line = format!("{} {}", paint(icon), paint(&state_name));
        if let Some(reason) = status.reason.as_deref().filter(|r| !r.is_empty()) {
            line.push_str(&format!(" - {}", self.painter.dim(reason)));
        }
        writeln!(state.out, "{}", line)
    }

    fn render_progress(
        &self,
        state: &mut TextState<W>,
        event: &UnifiedEvent,
    ) -> std::io::Result<()> {
        let Some(progress) = event.progress_payload() else {
            return Ok(());
        };
        if state.open == OpenLine::Progress {
            self.clear_line(state)?;
        } else {
            self.end_line(state)?;
        }

        let mut line = format!(
            "{} {} [{}] {}%",
            icons::PROGRESS,
            self.painter.color(&progress.stage, Color::Cyan),
            self.painter.color(&style::progress_bar(progress.percent), Color::Blue),
            progress.percent.min(100)
        );
        if !progress.message.is_empty() {
            line.push_str(&format!(" {}", self.painter.dim(&progress.message)));
        }

        if self.painter.is_interactive() {
            write!(state.out, "{}", line)?;
            state.open = OpenLine::Progress;
            Ok(())
        } else {
            writeln!(state.out, "{}", line)
        }
    }

    fn render_error(&self, state: &mut TextState<W>, event: &UnifiedEvent) -> std::io::Result<()> {
        let Some(error) = event.error_payload() else {
            return Ok(());
        };
        self.end_line(state)?;
        writeln!(state.out)?;
        writeln!(
            state.out,
            "{}",
            self.painter.banner("ERROR", &error.message, Color::Red)
        )?;
        if let Some(code) = error.code.as_deref().filter(|c| !c.is_empty()) {
            writeln!(state.out, "  {}", self.painter.dim(&format!("Code: {}", code)))?;
        }
        Ok(())
    }

    fn render_done(&self, state: &mut TextState<W>) -> std::io::Result<()> {
        self.end_line(state)?;
        let elapsed = self.started.elapsed().as_secs_f64();
        let banner = self.painter.banner(
            "DONE",
            &format!("Completed in {:.1}s", elapsed),
            Color::Green,
        );
        writeln!(state.out, "{}", banner)
    }
}

impl<W: Write + Send> Renderer for TextRenderer<W> {
    fn render(&self, event: &UnifiedEvent) -> Result<(), RenderError> {
        let mut guard = self.state.lock().map_err(|_| RenderError::Poisoned)?;
        let state = &mut *guard;

        match event.event_type {
            EventType::Connected => self.render_connected(state, event)?,
            EventType::ToolStarted => {
                if let Some(tool) = event.tool() {
                    self.render_tool_started(state, tool)?;
                }
            }
            EventType::ToolCompleted => {
                if let Some(tool) = event.tool() {
                    self.render_tool_completed(state, tool)?;
                }
            }
            EventType::MessageChunk => {
                if let Some(message) = event.message_payload() {
                    self.render_chunk(state, message)?;
                }
            }
            EventType::Message => {
                if let Some(message) = event.message_payload() {
                    self.render_message(state, message)?;
                }
            }
            EventType::Status => self.render_status(state, event)?,
            EventType::Progress => self.render_progress(state, event)?,
            EventType::Error => self.render_error(state, event)?,
            EventType::Done => self.render_done(state)?,
            EventType::Unknown => return Ok(()),
        }

        state.out.flush()?;
        Ok(())
    }

    fn flush(&self) -> Result<(), RenderError> {
        let mut state = self.state.lock().map_err(|_| RenderError::Poisoned)?;
        state.out.flush()?;
        Ok(())
    }

    fn close(&self) -> Result<(), RenderError> {
        let mut guard = self.state.lock().map_err(|_| RenderError::Poisoned)?;
        let state = &mut *guard;
        self.end_line(state)?;
        state.out.flush()?;
        Ok(())
    }
}

fn role_header(role: &str) -> (&'static str, String) {
    match role {
        "assistant" => (icons::ASSISTANT, "Assistant:".to_string()),
        "planner" => (icons::PLANNER, "Planner:".to_string()),
        "user" => (icons::USER, "User:".to_string()),
        other => {
            let mut chars = other.chars();
            let label = match chars.next() {
                Some(first) => format!("{}{}:", first.to_uppercase(), chars.as_str()),
                None => "Message:".to_string(),
            };
            (icons::ASSISTANT, label)
        }
    }
}

/// Strings print bare, anything else as compact JSON.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// One-line (or few-line) summary of tool inputs, keyed on the tool kind.
fn format_tool_input(tool_name: &str, inputs: &Fields) -> String {
    let name = tool_name.to_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|n| name.contains(n));

    if has(&["bash", "shell", "terminal"]) {
        if let Some(command) = inputs.get_str("command") {
            return format!("$ {}", style::truncate_chars(command, COMMAND_PREVIEW_CHARS));
        }
    }
    if has(&["read", "write", "edit"]) {
        if let Some(path) = inputs.get_str("path").or_else(|| inputs.get_str("file_path")) {
            return format!("path: {}", path);
        }
    }
    if has(&["web", "fetch", "http"]) {
        if let Some(url) = inputs.get_str("url") {
            return format!("url: {}", url);
        }
    }
    if has(&["search", "grep", "find"]) {
        if let Some(pattern) = inputs.get_str("pattern") {
            return format!("pattern: {}", pattern);
        }
    }

    let parts: Vec<String> = inputs
        .iter()
        .map(|(key, value)| {
            format!(
                "{}: {}",
                key,
                style::truncate_chars(&display_value(value), INPUT_VALUE_CHARS)
            )
        })
        .collect();
    if parts.len() <= 2 {
        parts.join(", ")
    } else {
        parts.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render_all(options: TextOptions, events: &[UnifiedEvent]) -> String {
        let renderer = TextRenderer::new(Vec::new(), options);
        for event in events {
            renderer.render(event).unwrap();
        }
        renderer.close().unwrap();
        String::from_utf8(renderer.into_inner().unwrap()).unwrap()
    }

    fn completed(name: &str, outputs: Value, success: bool) -> UnifiedEvent {
        UnifiedEvent::tool_completed(ToolEvent {
            name: name.to_string(),
            inputs: Fields::new(),
            outputs: Fields::from_value(outputs),
            duration_seconds: 2.0,
            success,
            error: if success { None } else { Some("exit status 1".to_string()) },
        })
    }

    fn numbered_lines(count: usize) -> String {
        (1..=count)
            .map(|n| format!("line-{:02}", n))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_plain_mode_has_no_escape_sequences() {
        let out = render_all(
            TextOptions::default(),
            &[
                UnifiedEvent::connected("exec-1234567890abcdef"),
                UnifiedEvent::tool_started(
                    "Bash",
                    Fields::from_value(json!({"command": "ls -la"})),
                ),
                completed("Bash", json!({"stdout": "a\nb"}), true),
                UnifiedEvent::progress("Planning", "halfway", 50),
                UnifiedEvent::error("boom", Some("E42".to_string()), false),
                UnifiedEvent::done(),
            ],
        );

        assert!(!out.contains('\x1b'), "unexpected escape in {:?}", out);
        assert!(out.contains("│ CONNECTED • Execution exec-123456"));
        assert!(out.contains("   $ ls -la"));
        assert!(out.contains("✓ 💻 Bash (2.0s)"));
        assert!(out.contains("   │ a\n   │ b\n"));
        assert!(out.contains("⏳ Planning [██████████░░░░░░░░░░] 50% halfway\n"));
        assert!(out.contains("ERROR • boom"));
        assert!(out.contains("  Code: E42"));
        assert!(out.contains("DONE • Completed in"));
    }

    #[test]
    fn test_interactive_mode_clears_running_line() {
        let out = render_all(
            TextOptions {
                interactive: true,
                ..TextOptions::default()
            },
            &[
                UnifiedEvent::tool_started("shell", Fields::new()),
                completed("shell", json!({"stdout": "ok"}), true),
            ],
        );

        assert!(out.contains("running..."));
        assert!(out.contains("\r\x1b[2K"));
    }

    #[test]
    fn test_tool_output_truncated_to_line_limit() {
        let out = render_all(
            TextOptions::default(),
            &[completed("shell", json!({"stdout": numbered_lines(15)}), true)],
        );

        assert!(out.contains("line-10"));
        assert!(!out.contains("line-11"));
        assert!(out.contains("│ +5 more lines"));
    }

    #[test]
    fn test_full_output_and_verbose_limits() {
        let full = render_all(
            TextOptions {
                full_output: true,
                ..TextOptions::default()
            },
            &[completed("shell", json!({"stdout": numbered_lines(80)}), true)],
        );
        assert!(full.contains("line-80"));
        assert!(!full.contains("more lines"));

        let verbose = render_all(
            TextOptions {
                verbose: true,
                ..TextOptions::default()
            },
            &[completed("shell", json!({"stdout": numbered_lines(80)}), true)],
        );
        assert!(verbose.contains("line-50"));
        assert!(!verbose.contains("line-51"));
        assert!(verbose.contains("+30 more lines"));
    }

    #[test]
    fn test_longest_output_value_is_shown() {
        let out = render_all(
            TextOptions::default(),
            &[completed(
                "shell",
                json!({"exit_code": 0, "stdout": "the real output"}),
                true,
            )],
        );
        assert!(out.contains("│ the real output"));
        assert!(!out.contains("│ 0\n"));
    }

    #[test]
    fn test_compact_shows_only_completion() {
        let out = render_all(
            TextOptions {
                compact: true,
                ..TextOptions::default()
            },
            &[
                UnifiedEvent::message_chunk("assistant", "thinking out loud"),
                UnifiedEvent::tool_started("shell", Fields::from_value(json!({"command": "ls"}))),
                completed("shell", json!({"stdout": "a\nb"}), false),
            ],
        );

        assert!(!out.contains("running..."));
        assert!(!out.contains("Output"));
        assert!(!out.contains("thinking out loud"));
        assert!(out.contains("✗ 💻 Shell (2.0s)"));
        assert!(out.contains("└─ exit status 1"));
    }

    #[test]
    fn test_chunks_concatenate_under_one_header() {
        let out = render_all(
            TextOptions::default(),
            &[
                UnifiedEvent::message_chunk("assistant", "Hel"),
                UnifiedEvent::message_chunk("assistant", "(no content)"),
                UnifiedEvent::message_chunk("assistant", "lo"),
                UnifiedEvent::message_chunk("assistant", ""),
                UnifiedEvent::message_chunk("assistant", " world"),
                UnifiedEvent::status("completed"),
            ],
        );

        assert_eq!(out.matches("Assistant:").count(), 1);
        assert!(out.contains("💬 Assistant:\nHello world\n✓ completed\n"));
    }

    #[test]
    fn test_role_change_starts_new_header() {
        let out = render_all(
            TextOptions::default(),
            &[
                UnifiedEvent::message_chunk("planner", "step one"),
                UnifiedEvent::message_chunk("assistant", "answer"),
            ],
        );
        assert!(out.contains("🧠 Planner:\nstep one\n"));
        assert!(out.contains("💬 Assistant:\nanswer\n"));
    }

    #[test]
    fn test_status_visibility() {
        let mut failed = UnifiedEvent::status("failed");
        if let Some(status) = failed.status_payload_mut() {
            status.reason = Some("tool crashed".to_string());
        }

        let out = render_all(
            TextOptions::default(),
            &[
                UnifiedEvent::status("running"),
                UnifiedEvent::status("unknown"),
                UnifiedEvent::status("waiting_for_input"),
                failed,
                UnifiedEvent::status("queued"),
            ],
        );

        assert!(!out.contains("running"));
        assert!(!out.contains("unknown"));
        assert!(out.contains("COMPLETE • Waiting for input"));
        assert!(out.contains("✗ failed - tool crashed"));
        assert!(out.contains("● queued"));
    }

    #[test]
    fn test_long_message_truncated_unless_verbose() {
        let long = "x".repeat(400);
        let short = render_all(
            TextOptions::default(),
            &[UnifiedEvent::message("assistant", long.clone())],
        );
        assert!(short.contains(&format!("{}...", "x".repeat(300))));
        assert!(!short.contains(&"x".repeat(301)));

        let verbose = render_all(
            TextOptions {
                verbose: true,
                ..TextOptions::default()
            },
            &[UnifiedEvent::message("assistant", long.clone())],
        );
        assert!(verbose.contains(&long));
    }

    #[test]
    fn test_message_roles() {
        let out = render_all(
            TextOptions::default(),
            &[
                UnifiedEvent::message("user", "hi"),
                UnifiedEvent::message("system", "session resumed"),
                UnifiedEvent::message("reviewer", "lgtm"),
            ],
        );
        assert!(out.contains("👤 User:\nhi\n"));
        assert!(out.contains("ℹ session resumed"));
        assert!(out.contains("[REVIEWER] lgtm"));
    }

    #[test]
    fn test_unknown_events_ignored() {
        let out = render_all(TextOptions::default(), &[UnifiedEvent::new(EventType::Unknown)]);
        assert!(out.is_empty());
    }

    #[test]
    fn test_format_tool_input() {
        let bash = Fields::from_value(json!({"command": "echo hi", "timeout": 5}));
        assert_eq!(format_tool_input("Bash", &bash), "$ echo hi");

        let read = Fields::from_value(json!({"file_path": "/etc/hosts"}));
        assert_eq!(format_tool_input("Read", &read), "path: /etc/hosts");

        let grep = Fields::from_value(json!({"pattern": "TODO"}));
        assert_eq!(format_tool_input("Grep", &grep), "pattern: TODO");

        let two = Fields::from_value(json!({"a": 1, "b": "two"}));
        assert_eq!(format_tool_input("deploy", &two), "a: 1, b: two");

        let three = Fields::from_value(json!({"a": 1, "b": 2, "c": 3}));
        assert_eq!(format_tool_input("deploy", &three), "a: 1\nb: 2\nc: 3");
    }

    #[test]
    fn test_multiline_inputs_use_section() {
        let out = render_all(
            TextOptions::default(),
            &[UnifiedEvent::tool_started(
                "deploy",
                Fields::from_value(json!({"env": "prod", "region": "eu", "replicas": 3})),
            )],
        );
        assert!(out.contains("┌─ Input"));
        assert!(out.contains("   │ region: eu"));
    }
}
