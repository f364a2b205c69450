// Standard library
use std::error::Error as StdError;
use std::sync::Arc;

// External crates
use chrono::Local;
use serde::Serialize;
use serde_json::Value;

// Internal imports
use crate::args::{arg, process_args, Args};
use crate::caller::CallSite;
use crate::config::{Config, TimeFormat};
use crate::level::Level;
use crate::printf;
use crate::render::{self, Entry};
use crate::sink::Sink;

/// Output encoding of a [`Logger`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// One JSON object per line.
    Compact,
    /// Aligned console lines for humans.
    Pretty,
}

/// A configured sink, minimum level and set of attached fields.
///
/// Handles are immutable. Every `with_*` method returns a new handle that
/// shares the sink, so deriving a component logger never affects the handle
/// it came from.
#[derive(Debug, Clone)]
pub struct Logger {
    sink: Sink,
    min_level: Level,
    format: Format,
    time_format: TimeFormat,
    fields: Arc<Vec<(String, Value)>>,
}

impl Logger {
    /// Compact output at `info` with RFC 3339 timestamps.
    pub fn new(sink: Sink) -> Self {
        Self {
            sink,
            min_level: Level::Info,
            format: Format::Compact,
            time_format: TimeFormat::default(),
            fields: Arc::default(),
        }
    }

    /// Resolve `config` into a handle. Unknown levels mean `info`.
    pub fn from_config(config: Config) -> Self {
        let sink = config.output.map(Sink::new).unwrap_or_else(Sink::stderr);
        let format = if config.pretty {
            Format::Pretty
        } else {
            Format::Compact
        };

        Self {
            sink,
            min_level: Level::lookup(&config.level),
            format,
            time_format: TimeFormat::parse(&config.time_format),
            fields: Arc::default(),
        }
    }

    pub fn with_min_level(&self, min_level: Level) -> Self {
        Self {
            min_level,
            ..self.clone()
        }
    }

    pub fn with_format(&self, format: Format) -> Self {
        Self {
            format,
            ..self.clone()
        }
    }

    pub fn with_time_format(&self, time_format: TimeFormat) -> Self {
        Self {
            time_format,
            ..self.clone()
        }
    }

    /// Derive a handle whose events all carry `key = value`.
    pub fn with_field<T: Serialize + ?Sized>(&self, key: impl Into<String>, value: &T) -> Self {
        self.with_value(key, arg(value))
    }

    pub fn with_value(&self, key: impl Into<String>, value: Value) -> Self {
        let mut fields = Vec::with_capacity(self.fields.len() + 1);
        fields.extend(self.fields.iter().cloned());
        fields.push((key.into(), value));
        Self {
            fields: Arc::new(fields),
            ..self.clone()
        }
    }

    pub fn with_component(&self, component: &str) -> Self {
        self.with_value("component", Value::from(component))
    }

    pub fn min_level(&self) -> Level {
        self.min_level
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn time_format(&self) -> &TimeFormat {
        &self.time_format
    }

    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    pub fn sink(&self) -> &Sink {
        &self.sink
    }

    /// Whether `level` passes both this handle's minimum and the
    /// process-wide one committed by [`crate::initialize`].
    pub fn enabled(&self, level: Level) -> bool {
        level.passes(self.min_level) && level.passes(crate::global::min_level())
    }

    /// Open an event at `level`. Events below the minimum level accept
    /// fields but write nothing.
    pub fn event(&self, level: Level) -> Event<'_> {
        Event {
            logger: self,
            level,
            enabled: self.enabled(level),
            fields: Vec::new(),
        }
    }

    pub fn debug(&self, template: &str, values: &[Value]) {
        process_args(self.event(Level::Debug), template, values);
    }

    pub fn info(&self, template: &str, values: &[Value]) {
        process_args(self.event(Level::Info), template, values);
    }

    pub fn warn(&self, template: &str, values: &[Value]) {
        process_args(self.event(Level::Warn), template, values);
    }

    pub fn error(&self, err: Option<&dyn StdError>, template: &str, values: &[Value]) {
        process_args(self.event(Level::Error).err(err), template, values);
    }

    /// Emit at `fatal`, flush, and exit the process with status 1.
    ///
    /// The exit happens even when `fatal` is below the minimum level.
    pub fn fatal(&self, err: Option<&dyn StdError>, template: &str, values: &[Value]) -> ! {
        process_args(self.event(Level::Fatal).err(err), template, values);
        self.flush();
        std::process::exit(1)
    }

    /// Emit at any level with an explicit interpretation.
    ///
    /// Never exits, not even for `Level::Fatal`.
    pub fn log(&self, level: Level, template: &str, args: Args) {
        self.event(level).finish(template, args);
    }

    pub fn flush(&self) {
        self.sink.flush();
    }
}

/// A single log event under construction.
#[must_use = "an event is only written by `msg`, `msgf` or `finish`"]
pub struct Event<'a> {
    logger: &'a Logger,
    level: Level,
    enabled: bool,
    fields: Vec<(String, Value)>,
}

impl<'a> Event<'a> {
    pub fn level(&self) -> Level {
        self.level
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    pub fn field(mut self, key: impl Into<String>, value: Value) -> Self {
        if self.enabled {
            self.fields.push((key.into(), value));
        }
        self
    }

    /// Attach `error = <display form>`. `None` attaches nothing.
    pub fn err(self, err: Option<&dyn StdError>) -> Self {
        match err {
            Some(err) => self.field("error", Value::String(err.to_string())),
            None => self,
        }
    }

    /// Attach `caller = "<file>:<line>"`. `None` attaches nothing.
    pub fn caller(self, site: Option<CallSite>) -> Self {
        match site {
            Some(site) => self.field("caller", Value::String(site.to_string())),
            None => self,
        }
    }

    pub fn msg(self, message: &str) {
        self.write(message);
    }

    pub fn msgf(self, template: &str, values: &[Value]) {
        if self.enabled {
            let message = printf::sprintf(template, values);
            self.write(&message);
        }
    }

    /// Apply an interpretation of the call's arguments and emit.
    pub fn finish(self, template: &str, args: Args) {
        match args {
            Args::Formatted(values) => self.msgf(template, &values),
            Args::Fielded(pairs) => {
                let mut event = self;
                for (key, value) in pairs {
                    event = event.field(key, value);
                }
                event.msg(template);
            }
            Args::None => self.msg(template),
        }
    }

    fn write(self, message: &str) {
        if !self.enabled {
            return;
        }

        let logger = self.logger;
        let time = logger.time_format.render(&Local::now());
        let entry = Entry {
            level: self.level,
            time: &time,
            fields: logger.fields.iter().chain(self.fields.iter()).collect(),
            message,
        };

        let line = match logger.format {
            Format::Compact => render::compact(&entry),
            Format::Pretty => render::pretty(&entry, logger.sink.supports_color()),
        };
        logger.sink.write_line(&line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::SharedBuffer;
    use serde_json::{json, Map};
    use std::fs;
    use std::io;

    fn buffered(config: Config) -> (Logger, SharedBuffer) {
        let buffer = SharedBuffer::new();
        let logger = Logger::from_config(config.output(Box::new(buffer.clone())));
        (logger, buffer)
    }

    fn parse_lines(buffer: &SharedBuffer) -> Vec<Map<String, Value>> {
        buffer
            .lines()
            .iter()
            .map(|line| match serde_json::from_str(line) {
                Ok(Value::Object(map)) => map,
                other => panic!("not a JSON object: {line} ({other:?})"),
            })
            .collect()
    }

    fn keys(map: &Map<String, Value>) -> Vec<&str> {
        let mut keys: Vec<&str> = map.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    #[test]
    fn test_printf_call_has_no_extra_fields() {
        let (logger, buffer) = buffered(Config::default());
        logger.info("got %d items", &[json!(5)]);

        let lines = parse_lines(&buffer);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["message"], json!("got 5 items"));
        assert_eq!(lines[0]["level"], json!("info"));
        assert_eq!(keys(&lines[0]), vec!["level", "message", "time"]);
    }

    #[test]
    fn test_key_value_call_attaches_fields() {
        let (logger, buffer) = buffered(Config::default());
        logger.info(
            "user event",
            &[json!("user"), json!("alice"), json!("action"), json!("login")],
        );

        let lines = parse_lines(&buffer);
        assert_eq!(lines[0]["message"], json!("user event"));
        assert_eq!(lines[0]["user"], json!("alice"));
        assert_eq!(lines[0]["action"], json!("login"));

        let raw = buffer.contents();
        assert!(raw.find(r#""user""#) < raw.find(r#""action""#));
    }

    #[test]
    fn test_odd_key_value_call_drops_last_key() {
        let (logger, buffer) = buffered(Config::default());
        logger.warn("odd case", &[json!("key1"), json!("val1"), json!("key2")]);

        let lines = parse_lines(&buffer);
        assert_eq!(lines[0]["key1"], json!("val1"));
        assert!(!lines[0].contains_key("key2"));
        assert_eq!(keys(&lines[0]), vec!["key1", "level", "message", "time"]);
    }

    #[test]
    fn test_plain_call_is_verbatim() {
        let (logger, buffer) = buffered(Config::default());
        logger.info("plain 100%", &[]);

        let lines = parse_lines(&buffer);
        assert_eq!(lines[0]["message"], json!("plain 100%"));
        assert_eq!(keys(&lines[0]), vec!["level", "message", "time"]);
    }

    #[test]
    fn test_duplicate_keys_are_all_written() {
        let (logger, buffer) = buffered(Config::default());
        logger.info("dup", &[json!("k"), json!(1), json!("k"), json!(2)]);

        let raw = buffer.contents();
        assert!(raw.contains(r#""k":1,"k":2"#));
        // Readers that de-duplicate see the last value.
        assert_eq!(parse_lines(&buffer)[0]["k"], json!(2));
    }

    #[test]
    fn test_level_gate() {
        let (logger, buffer) = buffered(Config::default().level("warn"));

        logger.debug("debug line", &[]);
        logger.info("info line", &[]);
        logger.warn("warn line", &[]);
        logger.error(None, "error line", &[]);

        let messages: Vec<Value> = parse_lines(&buffer)
            .into_iter()
            .map(|line| line["message"].clone())
            .collect();
        assert_eq!(messages, vec![json!("warn line"), json!("error line")]);
    }

    #[test]
    fn test_disabled_suppresses_everything() {
        let (logger, buffer) = buffered(Config::default().level("disabled"));
        logger.error(None, "nothing", &[]);
        logger.log(Level::Panic, "still nothing", Args::None);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_unknown_level_means_info() {
        let (logger, _buffer) = buffered(Config::default().level("chatty"));
        assert_eq!(logger.min_level(), Level::Info);
    }

    #[test]
    fn test_error_field() {
        let (logger, buffer) = buffered(Config::default());
        let err = io::Error::new(io::ErrorKind::NotFound, "config.yaml missing");

        logger.error(Some(&err), "load failed", &[json!("path"), json!("/etc/vm")]);
        logger.error(None, "no error value", &[]);

        let lines = parse_lines(&buffer);
        assert_eq!(lines[0]["error"], json!("config.yaml missing"));
        assert_eq!(lines[0]["path"], json!("/etc/vm"));
        assert!(!lines[1].contains_key("error"));
    }

    #[test]
    fn test_derived_handles_do_not_touch_the_original() {
        let (root, buffer) = buffered(Config::default());
        let db = root.with_component("db");
        let tagged = db.with_field("shard", &3);

        root.info("from root", &[]);
        db.info("from db", &[]);
        tagged.info("from shard", &[]);

        let lines = parse_lines(&buffer);
        assert!(!lines[0].contains_key("component"));
        assert_eq!(lines[1]["component"], json!("db"));
        assert!(!lines[1].contains_key("shard"));
        assert_eq!(lines[2]["component"], json!("db"));
        assert_eq!(lines[2]["shard"], json!(3));
        assert!(root.fields().is_empty());
        assert!(root.sink().same_stream(tagged.sink()));
    }

    #[test]
    fn test_field_order() {
        let (root, buffer) = buffered(Config::default());
        let logger = root.with_component("api");
        let err = io::Error::new(io::ErrorKind::Other, "boom");

        logger
            .event(Level::Error)
            .err(Some(&err))
            .caller(Some(CallSite::new("src/api.rs", 10)))
            .field("status", json!(500))
            .msg("failed");

        let raw = buffer.contents();
        let order: Vec<usize> = [
            r#""level""#,
            r#""time""#,
            r#""component""#,
            r#""error""#,
            r#""caller""#,
            r#""status""#,
            r#""message""#,
        ]
        .iter()
        .map(|key| raw.find(key).unwrap())
        .collect();
        assert!(order.windows(2).all(|pair| pair[0] < pair[1]), "{raw}");
    }

    #[test]
    fn test_pretty_output() {
        let (logger, buffer) = buffered(Config::default().pretty(true).time_format("%H"));
        logger
            .with_component("db")
            .info("user event", &[json!("user"), json!("alice")]);

        let line = &buffer.lines()[0];
        assert!(line.contains(" INF user event component=db user=alice"), "{line}");
        assert!(!line.starts_with('{'));
    }

    #[test]
    fn test_unix_time_format() {
        let (logger, buffer) = buffered(Config::default().time_format("unix"));
        logger.info("tick", &[]);
        assert!(parse_lines(&buffer)[0]["time"].is_i64());
    }

    #[test]
    fn test_explicit_args_bypass_sniffing() {
        let (logger, buffer) = buffered(Config::default());
        logger.log(
            Level::Info,
            "rate 100%",
            Args::fielded([("rate", json!(1.0))]),
        );
        logger.log(Level::Fatal, "%s only", Args::formatted(vec![json!("formatted")]));

        let lines = parse_lines(&buffer);
        assert_eq!(lines[0]["message"], json!("rate 100%"));
        assert_eq!(lines[0]["rate"], json!(1.0));
        assert_eq!(lines[1]["message"], json!("formatted only"));
        assert_eq!(lines[1]["level"], json!("fatal"));
    }

    #[test]
    fn test_disabled_event_collects_nothing() {
        let (logger, _buffer) = buffered(Config::default().level("error"));
        let event = logger.event(Level::Debug).field("ignored", json!(1));
        assert!(!event.enabled());
        assert!(event.fields().is_empty());
        event.msg("dropped");
    }

    #[test]
    fn test_file_output() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let writer = file.reopen().unwrap();
        let logger = Logger::from_config(Config::default().output(Box::new(writer)));

        logger.info("written to disk", &[json!("attempt"), json!(1)]);
        logger.flush();

        let contents = fs::read_to_string(file.path()).unwrap();
        let line: Value = serde_json::from_str(contents.trim()).unwrap();
        assert_eq!(line["message"], json!("written to disk"));
        assert_eq!(line["attempt"], json!(1));
    }
}
