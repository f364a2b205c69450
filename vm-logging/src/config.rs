// Standard library
use std::env;
use std::fmt::{self, Write as _};
use std::io::Write;

// External crates
use chrono::{DateTime, Local};
use serde::Deserialize;
use serde_json::Value;

/// RFC 3339 as a strftime pattern, e.g. `2026-10-14T09:30:00+02:00`.
pub const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// Settings applied once by [`crate::initialize`].
///
/// Every field has a default, so callers only spell out what they care about:
///
/// ```
/// use vm_logging::Config;
///
/// let config = Config {
///     level: "debug".into(),
///     pretty: true,
///     ..Config::default()
/// };
/// assert!(config.output.is_none());
/// ```
#[derive(Deserialize)]
#[serde(default)]
pub struct Config {
    /// debug, info, warn, error, fatal, panic or disabled. Anything else means info.
    pub level: String,
    /// Human-readable console lines instead of one JSON object per line.
    pub pretty: bool,
    /// Attach `caller = "<file>:<line>"` to events.
    pub with_caller: bool,
    /// strftime pattern, or `unix` / `unixms` / `unixmicro` for epoch numbers.
    pub time_format: String,
    /// Defaults to stderr.
    #[serde(skip)]
    pub output: Option<Box<dyn Write + Send>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            pretty: false,
            with_caller: false,
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            output: None,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create configuration from environment variables
    ///
    /// - `LOG_LEVEL` - minimum level name
    /// - `LOG_FORMAT` - `pretty` or `human` for console lines, anything else is compact
    /// - `LOG_CALLER` - `1`, `true` or `yes` to attach caller locations
    /// - `LOG_TIME_FORMAT` - timestamp pattern
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(level) = env::var("LOG_LEVEL") {
            config.level = level;
        }
        if let Ok(format) = env::var("LOG_FORMAT") {
            config.pretty = matches!(format.to_lowercase().as_str(), "pretty" | "human");
        }
        if let Ok(caller) = env::var("LOG_CALLER") {
            config.with_caller = matches!(caller.to_lowercase().as_str(), "1" | "true" | "yes");
        }
        if let Ok(time_format) = env::var("LOG_TIME_FORMAT") {
            config.time_format = time_format;
        }

        config
    }

    pub fn level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn with_caller(mut self, with_caller: bool) -> Self {
        self.with_caller = with_caller;
        self
    }

    pub fn time_format(mut self, time_format: impl Into<String>) -> Self {
        self.time_format = time_format.into();
        self
    }

    pub fn output(mut self, output: Box<dyn Write + Send>) -> Self {
        self.output = Some(output);
        self
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("level", &self.level)
            .field("pretty", &self.pretty)
            .field("with_caller", &self.with_caller)
            .field("time_format", &self.time_format)
            .field(
                "output",
                &if self.output.is_some() {
                    "<writer>"
                } else {
                    "stderr"
                },
            )
            .finish()
    }
}

/// How the automatic `time` field is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeFormat {
    Unix,
    UnixMs,
    UnixMicro,
    Pattern(String),
}

impl Default for TimeFormat {
    fn default() -> Self {
        TimeFormat::Pattern(DEFAULT_TIME_FORMAT.to_string())
    }
}

impl TimeFormat {
    /// Empty input resolves to the RFC 3339 default.
    pub fn parse(format: &str) -> Self {
        match format {
            "" => Self::default(),
            "unix" => TimeFormat::Unix,
            "unixms" => TimeFormat::UnixMs,
            "unixmicro" => TimeFormat::UnixMicro,
            pattern => TimeFormat::Pattern(pattern.to_string()),
        }
    }

    pub fn render(&self, now: &DateTime<Local>) -> Value {
        match self {
            TimeFormat::Unix => Value::from(now.timestamp()),
            TimeFormat::UnixMs => Value::from(now.timestamp_millis()),
            TimeFormat::UnixMicro => Value::from(now.timestamp_micros()),
            TimeFormat::Pattern(pattern) => {
                let mut rendered = String::new();
                // chrono reports bad specifiers as a formatting error; fall back.
                if write!(rendered, "{}", now.format(pattern)).is_err() {
                    rendered = now.to_rfc3339();
                }
                Value::String(rendered)
            }
        }
    }
}
