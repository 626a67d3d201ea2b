//! Streaming configuration.
//!
//! Settings come from defaults, then `EXECSTREAM_*` environment variables,
//! then explicit builder calls (the CLI applies its flags last).

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::client::DEFAULT_BASE_URL;
use crate::error::ConfigError;
use crate::events::EventType;
use crate::render::{TextOptions, DEFAULT_OUTPUT_LINES};
use crate::stream::{
    ReconnectPolicy, DEFAULT_EVENT_BUFFER, DEFAULT_MAX_RECONNECTS, DEFAULT_RECONNECT_DELAY,
};

pub const ENV_BASE_URL: &str = "EXECSTREAM_BASE_URL";
pub const ENV_API_KEY: &str = "EXECSTREAM_API_KEY";
pub const ENV_MAX_RECONNECTS: &str = "EXECSTREAM_MAX_RECONNECTS";
pub const ENV_RECONNECT_DELAY_MS: &str = "EXECSTREAM_RECONNECT_DELAY_MS";
pub const ENV_FORMAT: &str = "EXECSTREAM_FORMAT";

/// Requested output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StreamFormat {
    /// Pick for the caller. Currently always text.
    #[default]
    Auto,
    Text,
    Json,
}

impl StreamFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamFormat::Auto => "auto",
            StreamFormat::Text => "text",
            StreamFormat::Json => "json",
        }
    }

    /// Lenient name lookup: unknown or empty names fall back to `Auto`.
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }

    /// The concrete format to render with. Only `json` selects JSON.
    pub fn resolve(self) -> StreamFormat {
        match self {
            StreamFormat::Json => StreamFormat::Json,
            StreamFormat::Auto | StreamFormat::Text => StreamFormat::Text,
        }
    }
}

impl fmt::Display for StreamFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StreamFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "auto" => Ok(StreamFormat::Auto),
            "text" => Ok(StreamFormat::Text),
            "json" => Ok(StreamFormat::Json),
            _ => Err(ConfigError::UnknownFormat(s.to_string())),
        }
    }
}

/// Everything needed to stream and render one execution.
///
/// # Example
///
/// ```
/// use execstream::config::{StreamConfig, StreamFormat};
///
/// let config = StreamConfig::new()
///     .with_api_key("secret")
///     .with_format(StreamFormat::Json)
///     .with_verbose(true);
/// assert_eq!(config.format.resolve(), StreamFormat::Json);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct StreamConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub max_reconnects: u32,
    pub reconnect_delay: Duration,
    /// Capacity of the controller's event channel.
    pub event_buffer: usize,
    pub format: StreamFormat,
    pub verbose: bool,
    pub compact: bool,
    pub full_output: bool,
    pub output_lines: usize,
    /// Event types to show. Empty shows everything.
    pub event_types: Vec<EventType>,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            max_reconnects: DEFAULT_MAX_RECONNECTS,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            event_buffer: DEFAULT_EVENT_BUFFER,
            format: StreamFormat::Auto,
            verbose: false,
            compact: false,
            full_output: false,
            output_lines: DEFAULT_OUTPUT_LINES,
            event_types: Vec::new(),
        }
    }
}

impl StreamConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from `lookup`. Empty values are ignored.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get(ENV_BASE_URL) {
            config.base_url = url.trim().to_string();
        }
        if let Some(key) = get(ENV_API_KEY) {
            config.api_key = Some(key.trim().to_string());
        }
        if let Some(raw) = get(ENV_MAX_RECONNECTS) {
            config.max_reconnects = parse_number(ENV_MAX_RECONNECTS, &raw)?;
        }
        if let Some(raw) = get(ENV_RECONNECT_DELAY_MS) {
            let millis: u64 = parse_number(ENV_RECONNECT_DELAY_MS, &raw)?;
            config.reconnect_delay = Duration::from_millis(millis);
        }
        if let Some(raw) = get(ENV_FORMAT) {
            config.format = raw.parse()?;
        }

        Ok(config)
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_max_reconnects(mut self, max: u32) -> Self {
        self.max_reconnects = max;
        self
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    pub fn with_event_buffer(mut self, capacity: usize) -> Self {
        self.event_buffer = capacity.max(1);
        self
    }

    pub fn with_format(mut self, format: StreamFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    pub fn with_full_output(mut self, full: bool) -> Self {
        self.full_output = full;
        self
    }

    /// Zero keeps the default.
    pub fn with_output_lines(mut self, lines: usize) -> Self {
        self.output_lines = if lines == 0 { DEFAULT_OUTPUT_LINES } else { lines };
        self
    }

    pub fn with_event_types(mut self, types: impl IntoIterator<Item = EventType>) -> Self {
        self.event_types = types.into_iter().collect();
        self
    }

    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy::new(self.max_reconnects, self.reconnect_delay)
    }

    pub fn text_options(&self, interactive: bool) -> TextOptions {
        TextOptions {
            verbose: self.verbose,
            output_lines: self.output_lines,
            full_output: self.full_output,
            compact: self.compact,
            interactive,
        }
    }
}

fn parse_number<T: FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = StreamConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.max_reconnects, 100);
        assert_eq!(config.reconnect_delay, Duration::from_secs(1));
        assert_eq!(config.event_buffer, 100);
        assert_eq!(config.output_lines, 10);
        assert_eq!(config.format, StreamFormat::Auto);
        assert!(config.event_types.is_empty());
    }

    #[test]
    fn test_env_overrides() {
        let config = StreamConfig::from_lookup(lookup(&[
            (ENV_BASE_URL, "http://localhost:8080"),
            (ENV_API_KEY, " key-123 "),
            (ENV_MAX_RECONNECTS, "5"),
            (ENV_RECONNECT_DELAY_MS, "250"),
            (ENV_FORMAT, "JSON"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.api_key.as_deref(), Some("key-123"));
        assert_eq!(config.max_reconnects, 5);
        assert_eq!(config.reconnect_delay, Duration::from_millis(250));
        assert_eq!(config.format, StreamFormat::Json);
    }

    #[test]
    fn test_empty_env_values_ignored() {
        let config = StreamConfig::from_lookup(lookup(&[(ENV_MAX_RECONNECTS, "  ")])).unwrap();
        assert_eq!(config.max_reconnects, DEFAULT_MAX_RECONNECTS);
    }

    #[test]
    fn test_invalid_env_values() {
        let err = StreamConfig::from_lookup(lookup(&[(ENV_MAX_RECONNECTS, "lots")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: ENV_MAX_RECONNECTS.to_string(),
                value: "lots".to_string()
            }
        );

        let err = StreamConfig::from_lookup(lookup(&[(ENV_RECONNECT_DELAY_MS, "-1")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        let err = StreamConfig::from_lookup(lookup(&[(ENV_FORMAT, "xml")])).unwrap_err();
        assert_eq!(err, ConfigError::UnknownFormat("xml".to_string()));
    }

    #[test]
    fn test_builder_overrides_env() {
        let config = StreamConfig::from_lookup(lookup(&[(ENV_FORMAT, "json")]))
            .unwrap()
            .with_format(StreamFormat::Text)
            .with_output_lines(0)
            .with_event_buffer(0);
        assert_eq!(config.format, StreamFormat::Text);
        assert_eq!(config.output_lines, DEFAULT_OUTPUT_LINES);
        assert_eq!(config.event_buffer, 1);
    }

    #[test]
    fn test_format_resolution() {
        assert_eq!(StreamFormat::from_name("auto").resolve(), StreamFormat::Text);
        assert_eq!(StreamFormat::from_name("").resolve(), StreamFormat::Text);
        assert_eq!(StreamFormat::from_name("yaml").resolve(), StreamFormat::Text);
        assert_eq!(StreamFormat::from_name("text").resolve(), StreamFormat::Text);
        assert_eq!(StreamFormat::from_name("json").resolve(), StreamFormat::Json);
    }

    #[test]
    fn test_derived_settings() {
        let config = StreamConfig::new()
            .with_max_reconnects(3)
            .with_reconnect_delay(Duration::from_millis(10))
            .with_compact(true)
            .with_output_lines(25);

        let policy = config.reconnect_policy();
        assert_eq!(policy.max_reconnects, 3);
        assert_eq!(policy.backoff, Duration::from_millis(10));

        let text = config.text_options(true);
        assert!(text.compact);
        assert!(text.interactive);
        assert_eq!(text.output_lines, 25);
    }
}
