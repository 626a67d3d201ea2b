//! Line-based terminal styling helpers for the text renderer.

use crossterm::style::{Color, Stylize};
use unicode_width::UnicodeWidthStr;

/// Minimum inner width of a banner box.
const MIN_BOX_WIDTH: usize = 30;

/// Width of the rule after a section title.
const SECTION_RULE_WIDTH: usize = 34;

/// Progress bar cell count.
pub const PROGRESS_CELLS: usize = 20;

/// Status icons
pub mod icons {
    pub const SUCCESS: &str = "✓";
    pub const FAILURE: &str = "✗";
    pub const CANCELLED: &str = "⊘";
    pub const STATE: &str = "●";
    pub const INFO: &str = "ℹ";
    pub const PROGRESS: &str = "⏳";
    pub const ASSISTANT: &str = "💬";
    pub const PLANNER: &str = "🧠";
    pub const USER: &str = "👤";
}

/// Spinner characters for loading animation.
pub const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Text emphasis applied on top of a color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Bold,
    Dim,
}

/// Applies ANSI styling only when the sink is an interactive terminal.
#[derive(Debug, Clone, Copy)]
pub struct Painter {
    interactive: bool,
}

impl Painter {
    pub fn new(interactive: bool) -> Self {
        Self { interactive }
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub fn paint(&self, text: &str, color: Option<Color>, tone: Tone) -> String {
        if !self.interactive || (color.is_none() && tone == Tone::Plain) {
            return text.to_string();
        }
        let mut styled = text.stylize();
        if let Some(color) = color {
            styled = styled.with(color);
        }
        match tone {
            Tone::Bold => styled = styled.bold(),
            Tone::Dim => styled = styled.dim(),
            Tone::Plain => {}
        }
        styled.to_string()
    }

    pub fn color(&self, text: &str, color: Color) -> String {
        self.paint(text, Some(color), Tone::Plain)
    }

    pub fn dim(&self, text: &str) -> String {
        self.paint(text, None, Tone::Dim)
    }

    pub fn bold(&self, text: &str) -> String {
        self.paint(text, None, Tone::Bold)
    }

    /// Three-line rounded box: `TITLE • content`.
    ///
    /// ```text
    /// ╭──────────────────────────────╮
    /// │ DONE • Completed in 4.2s     │
    /// ╰──────────────────────────────╯
    /// ```
    pub fn banner(&self, title: &str, content: &str, color: Color) -> String {
        let used = title.width() + content.width() + 5;
        let width = used.max(MIN_BOX_WIDTH);
        let padding = " ".repeat(width - used);

        let top = format!("╭{}╮", "─".repeat(width));
        let bottom = format!("╰{}╯", "─".repeat(width));
        let middle = format!(
            "│ {} {} {}{} │",
            self.paint(title, Some(color), Tone::Bold),
            self.dim("•"),
            content,
            padding
        );

        format!(
            "{}\n{}\n{}",
            self.color(&top, color),
            middle,
            self.color(&bottom, color)
        )
    }

    /// `   ┌─ Title ───...`
    pub fn section_top(&self, title: &str) -> String {
        let head = format!("   ┌─ {} ", title);
        let rule = SECTION_RULE_WIDTH.saturating_sub(title.width() + 1);
        self.dim(&format!("{}{}", head, "─".repeat(rule)))
    }

    pub fn section_line(&self, line: &str, color: Option<Color>) -> String {
        format!("   │ {}", self.paint(line, color, Tone::Plain))
    }

    pub fn section_bottom(&self) -> String {
        self.dim(&format!("   └{}", "─".repeat(SECTION_RULE_WIDTH + 4)))
    }
}

/// `█` / `░` bar for a 0-100 percentage.
pub fn progress_bar(percent: u8) -> String {
    let filled = usize::from(percent.min(100)) * PROGRESS_CELLS / 100;
    format!(
        "{}{}",
        "█".repeat(filled),
        "░".repeat(PROGRESS_CELLS - filled)
    )
}

/// Cut `text` to at most `max` characters, ending in `...` when cut.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(3);
    let mut cut: String = text.chars().take(keep).collect();
    cut.push_str("...");
    cut
}

/// Keep the first `max_lines` lines. Returns the kept text and the number
/// of omitted lines. `max_lines == 0` keeps everything.
pub fn truncate_lines(text: &str, max_lines: usize) -> (String, usize) {
    if text.is_empty() || max_lines == 0 {
        return (text.to_string(), 0);
    }
    let lines: Vec<&str> = text.split('\n').collect();
    if lines.len() <= max_lines {
        return (text.to_string(), 0);
    }
    (lines[..max_lines].join("\n"), lines.len() - max_lines)
}

/// Icon for a tool, picked from keywords in its name.
pub fn tool_icon(tool_name: &str) -> &'static str {
    let name = tool_name.to_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| name.contains(w));

    if name.starts_with("mcp__") {
        return if has(&["context-graph", "memory"]) {
            "🧠"
        } else if has(&["grounding"]) {
            "📊"
        } else {
            "🔌"
        };
    }

    if has(&["bash", "shell", "terminal"]) {
        "💻"
    } else if has(&["read", "file"]) {
        "📄"
    } else if has(&["write", "edit"]) {
        "✏️"
    } else if has(&["search", "grep", "find"]) {
        "🔍"
    } else if has(&["web", "http", "api"]) {
        "🌐"
    } else if has(&["database", "sql", "query"]) {
        "🗃️"
    } else if has(&["task"]) {
        "📋"
    } else {
        "🔧"
    }
}

fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Human-friendly tool name.
///
/// `mcp__server__do_thing` becomes `server: Do Thing`, `read_file` becomes
/// `Read File`.
pub fn clean_tool_name(tool_name: &str) -> String {
    if tool_name.is_empty() {
        return "Tool".to_string();
    }

    if let Some(rest) = tool_name.strip_prefix("mcp__") {
        let parts: Vec<&str> = rest.split("__").collect();
        if parts.len() >= 2 {
            let action = title_case(&parts[1..].join(" ").replace('_', " "));
            return format!("{}: {}", parts[0], truncate_chars(&action, 25));
        }
    }

    truncate_chars(&title_case(&tool_name.replace('_', " ")), 30)
}
