use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::error::LogError;

/// Severity of a log event, ordered from least to most severe.
///
/// `Disabled` is only meaningful as a minimum level: it suppresses everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
    Panic,
    Disabled,
}

impl Level {
    pub const ALL: [Level; 7] = [
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::Fatal,
        Level::Panic,
        Level::Disabled,
    ];

    /// Case-insensitive lookup that never fails.
    ///
    /// Unknown names resolve to `Info`. Use `str::parse` for the strict form.
    pub fn lookup(name: &str) -> Level {
        name.parse().unwrap_or(Level::Info)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Fatal => "fatal",
            Level::Panic => "panic",
            Level::Disabled => "disabled",
        }
    }

    /// Three-letter tag used by the pretty rendering.
    pub fn tag(self) -> &'static str {
        match self {
            Level::Debug => "DBG",
            Level::Info => "INF",
            Level::Warn => "WRN",
            Level::Error => "ERR",
            Level::Fatal => "FTL",
            Level::Panic => "PNC",
            Level::Disabled => "???",
        }
    }

    /// Whether an event at `self` passes a `minimum` level gate.
    pub fn passes(self, minimum: Level) -> bool {
        self != Level::Disabled && minimum != Level::Disabled && self >= minimum
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = LogError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_lowercase().as_str() {
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            "fatal" => Ok(Level::Fatal),
            "panic" => Ok(Level::Panic),
            "disabled" => Ok(Level::Disabled),
            _ => Err(LogError::ParseLevel(name.to_string())),
        }
    }
}
