//! Routes records from the `log` and `tracing` ecosystems into the facade,
//! so dependencies logging through either end up in the same stream with the
//! same configuration.

// Standard library
use std::fmt;

// External crates
use serde_json::Value;
use tracing::field::{Field, Visit};
use tracing::subscriber::Interest;
use tracing::{Metadata, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

// Internal imports
use crate::global::{caller_enabled, current};
use crate::level::Level;
use crate::logger::Event;

static LOG_BRIDGE: LogBridge = LogBridge;

/// Install [`LogBridge`] as the `log` crate backend.
///
/// Does nothing if another backend was installed first.
pub(crate) fn install(min_level: Level) {
    if log::set_logger(&LOG_BRIDGE).is_ok() {
        log::set_max_level(level_filter(min_level));
    }
}

fn level_filter(min_level: Level) -> log::LevelFilter {
    match min_level {
        Level::Debug => log::LevelFilter::Debug,
        Level::Info => log::LevelFilter::Info,
        Level::Warn => log::LevelFilter::Warn,
        Level::Error | Level::Fatal | Level::Panic => log::LevelFilter::Error,
        Level::Disabled => log::LevelFilter::Off,
    }
}

fn from_log(level: log::Level) -> Level {
    match level {
        log::Level::Error => Level::Error,
        log::Level::Warn => Level::Warn,
        log::Level::Info => Level::Info,
        log::Level::Debug | log::Level::Trace => Level::Debug,
    }
}

fn from_tracing(level: &tracing::Level) -> Level {
    match *level {
        tracing::Level::ERROR => Level::Error,
        tracing::Level::WARN => Level::Warn,
        tracing::Level::INFO => Level::Info,
        _ => Level::Debug,
    }
}

fn located<'a>(event: Event<'a>, file: Option<&str>, line: Option<u32>) -> Event<'a> {
    match (file, line) {
        (Some(file), Some(line)) if caller_enabled() => {
            event.field("caller", Value::String(format!("{file}:{line}")))
        }
        _ => event,
    }
}

/// `log::Log` backend writing through the active handle.
///
/// The record's target becomes the `component` field.
pub struct LogBridge;

impl log::Log for LogBridge {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        current().enabled(from_log(metadata.level()))
    }

    fn log(&self, record: &log::Record) {
        let logger = current();
        let level = from_log(record.level());
        if !logger.enabled(level) {
            return;
        }

        let event = logger
            .event(level)
            .field("component", Value::from(record.target()));
        let event = located(event, record.file(), record.line());
        event.msg(&record.args().to_string());
    }

    fn flush(&self) {
        current().flush();
    }
}

/// `tracing` layer writing each event through the active handle.
///
/// ```
/// use tracing_subscriber::prelude::*;
/// use vm_logging::FacadeLayer;
///
/// let subscriber = tracing_subscriber::registry().with(FacadeLayer::new());
/// tracing::subscriber::with_default(subscriber, || {
///     tracing::info!(user = "alice", "login");
/// });
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct FacadeLayer;

impl FacadeLayer {
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for FacadeLayer
where
    S: Subscriber,
{
    // The active level can change once, at initialization, so interest is
    // never cached per callsite.
    fn register_callsite(&self, _metadata: &'static Metadata<'static>) -> Interest {
        Interest::sometimes()
    }

    fn enabled(&self, metadata: &Metadata<'_>, _ctx: Context<'_, S>) -> bool {
        current().enabled(from_tracing(metadata.level()))
    }

    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let logger = current();
        let level = from_tracing(metadata.level());
        if !logger.enabled(level) {
            return;
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let out = logger
            .event(level)
            .field("component", Value::from(metadata.target()));
        let mut out = located(out, metadata.file(), metadata.line());
        for (key, value) in visitor.fields {
            out = out.field(key, value);
        }
        out.msg(&visitor.message);
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: Vec<(String, Value)>,
}

impl FieldVisitor {
    fn record(&mut self, field: &Field, value: Value) {
        if field.name() == "message" {
            self.message = crate::printf::plain(&value);
        } else {
            self.fields.push((field.name().to_string(), value));
        }
    }
}

impl Visit for FieldVisitor {
    fn record_f64(&mut self, field: &Field, value: f64) {
        self.record(field, Value::from(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.record(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.record(field, Value::from(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.record(field, Value::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.record(field, Value::String(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.record(field, Value::String(format!("{value:?}")));
    }
}
