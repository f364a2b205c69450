//! Process-wide logger state.
//!
//! Until [`initialize`] runs, every call goes through a bootstrap handle:
//! compact JSON on stderr at `info`, no caller locations. The first
//! `initialize` call replaces it for the rest of the process; later calls
//! are no-ops.

// Standard library
use std::error::Error as StdError;
use std::sync::OnceLock;

// External crates
use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::Value;

// Internal imports
use crate::args::process_args;
use crate::bridge;
use crate::caller::CallSite;
use crate::config::Config;
use crate::level::Level;
use crate::logger::{Event, Logger};
use crate::sink::Sink;

struct State {
    logger: Logger,
    with_caller: bool,
}

static BOOTSTRAP: Lazy<State> = Lazy::new(|| State {
    logger: Logger::new(Sink::stderr()),
    with_caller: false,
});

static CONFIGURED: OnceLock<State> = OnceLock::new();

fn state() -> &'static State {
    CONFIGURED.get().unwrap_or_else(|| Lazy::force(&BOOTSTRAP))
}

/// Apply `config` to the whole process. Only the first call has any effect.
///
/// Safe to race from several threads: one configuration is committed, the
/// others wait for it to finish and then return, discarding their own.
/// This also routes the `log` crate's macros through the facade when no
/// other `log` backend is installed yet.
pub fn initialize(config: Config) {
    let mut committed = false;
    let state = CONFIGURED.get_or_init(|| {
        committed = true;
        State {
            with_caller: config.with_caller,
            logger: Logger::from_config(config),
        }
    });

    if committed {
        bridge::install(state.logger.min_level());
    }
}

/// The process-wide minimum level. Every handle, including ones derived
/// before [`initialize`], is gated on it as well as on its own level.
/// Before initialization nothing is gated beyond the handle itself.
pub fn min_level() -> Level {
    CONFIGURED
        .get()
        .map_or(Level::Debug, |state| state.logger.min_level())
}

pub fn is_initialized() -> bool {
    CONFIGURED.get().is_some()
}

/// The active handle: the configured one, or the bootstrap handle.
pub fn current() -> &'static Logger {
    &state().logger
}

pub fn caller_enabled() -> bool {
    state().with_caller
}

#[track_caller]
fn annotate(event: Event<'_>) -> Event<'_> {
    if caller_enabled() {
        event.caller(CallSite::current())
    } else {
        event
    }
}

#[track_caller]
fn derive(key: &str, value: Value) -> Logger {
    let state = state();
    let logger = match CallSite::current().filter(|_| state.with_caller) {
        Some(site) => state.logger.with_value("caller", Value::String(site.to_string())),
        None => state.logger.clone(),
    };
    logger.with_value(key, value)
}

/// A handle whose events all carry `component = <component>`.
///
/// With caller annotation on, the handle also carries the location of this
/// call. The active handle is left as it is.
#[track_caller]
pub fn get_logger(component: &str) -> Logger {
    derive("component", Value::from(component))
}

/// Like [`get_logger`] with an arbitrary key and value.
#[track_caller]
pub fn with_field<T: Serialize + ?Sized>(key: &str, value: &T) -> Logger {
    derive(key, crate::args::arg(value))
}

#[track_caller]
fn log_at(level: Level, err: Option<&dyn StdError>, template: &str, values: &[Value]) {
    let event = annotate(current().event(level).err(err));
    process_args(event, template, values);
}

#[track_caller]
pub fn debug(template: &str, values: &[Value]) {
    log_at(Level::Debug, None, template, values);
}

#[track_caller]
pub fn info(template: &str, values: &[Value]) {
    log_at(Level::Info, None, template, values);
}

#[track_caller]
pub fn warn(template: &str, values: &[Value]) {
    log_at(Level::Warn, None, template, values);
}

/// Log at `error`, attaching `err` (if any) as the `error` field.
#[track_caller]
pub fn error(err: Option<&dyn StdError>, template: &str, values: &[Value]) {
    log_at(Level::Error, err, template, values);
}

/// Log at `fatal`, flush, and exit the process with status 1.
#[track_caller]
pub fn fatal(err: Option<&dyn StdError>, template: &str, values: &[Value]) -> ! {
    log_at(Level::Fatal, err, template, values);
    current().flush();
    std::process::exit(1)
}

/// Display form of `err`, or an empty string.
pub fn format_error(err: Option<&dyn StdError>) -> String {
    err.map(|err| err.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct Timeout;

    impl fmt::Display for Timeout {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "operation timed out after 30s")
        }
    }

    impl StdError for Timeout {}

    #[test]
    fn test_format_error() {
        assert_eq!(format_error(None), "");
        let formatted = format_error(Some(&Timeout));
        assert!(!formatted.is_empty());
        assert!(formatted.contains("timed out"));
    }
}
