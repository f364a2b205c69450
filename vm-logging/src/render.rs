// External crates
use colored::{ColoredString, Colorize};
use serde_json::Value;

// Internal imports
use crate::level::Level;
use crate::printf::plain;

/// One fully-assembled event, ready to render.
pub(crate) struct Entry<'a> {
    pub level: Level,
    pub time: &'a Value,
    pub fields: Vec<&'a (String, Value)>,
    pub message: &'a str,
}

/// `{"level":"info","time":...,<fields>,"message":"..."}`
///
/// Keys are written in order and never de-duplicated. An empty message is
/// left out.
pub(crate) fn compact(entry: &Entry<'_>) -> String {
    let mut out = String::with_capacity(128);
    out.push('{');
    push_pair(&mut out, "level", &Value::from(entry.level.as_str()));
    out.push(',');
    push_pair(&mut out, "time", entry.time);
    for (key, value) in &entry.fields {
        out.push(',');
        push_pair(&mut out, key, value);
    }
    if !entry.message.is_empty() {
        out.push(',');
        push_pair(&mut out, "message", &Value::from(entry.message));
    }
    out.push('}');
    out
}

fn push_pair(out: &mut String, key: &str, value: &Value) {
    out.push_str(&Value::from(key).to_string());
    out.push(':');
    out.push_str(&value.to_string());
}

/// `<time> <LVL> [<caller> >] <message> error=... a=1 b=2`
///
/// The first `caller` field is promoted next to the level; `error` leads the
/// remaining fields, which are otherwise sorted by key.
pub(crate) fn pretty(entry: &Entry<'_>, color: bool) -> String {
    let mut parts = Vec::with_capacity(entry.fields.len() + 4);
    parts.push(paint(plain(entry.time), color, dim));
    parts.push(paint(entry.level.tag().to_string(), color, level_style(entry.level)));

    let caller = entry.fields.iter().position(|(key, _)| key == "caller");
    if let Some(index) = caller {
        let site = paint(plain(&entry.fields[index].1), color, bold);
        parts.push(format!("{site} >"));
    }

    if !entry.message.is_empty() {
        parts.push(entry.message.to_string());
    }

    let mut rest: Vec<&(String, Value)> = entry
        .fields
        .iter()
        .enumerate()
        .filter(|(index, _)| Some(*index) != caller)
        .map(|(_, field)| *field)
        .collect();
    rest.sort_by(|a, b| (a.0 != "error", &a.0).cmp(&(b.0 != "error", &b.0)));

    for (key, value) in rest {
        let style: Style = if key == "error" { red } else { cyan };
        parts.push(format!("{}={}", paint(key.clone(), color, style), console_value(value)));
    }

    parts.join(" ")
}

type Style = fn(&str) -> ColoredString;

fn paint(text: String, color: bool, style: Style) -> String {
    if color {
        style(&text).to_string()
    } else {
        text
    }
}

fn dim(s: &str) -> ColoredString {
    s.bright_black()
}

fn bold(s: &str) -> ColoredString {
    s.bold()
}

fn red(s: &str) -> ColoredString {
    s.red()
}

fn cyan(s: &str) -> ColoredString {
    s.cyan()
}

fn level_style(level: Level) -> Style {
    fn debug(s: &str) -> ColoredString {
        s.yellow()
    }
    fn info(s: &str) -> ColoredString {
        s.green()
    }
    fn severe(s: &str) -> ColoredString {
        s.red().bold()
    }

    match level {
        Level::Debug => debug,
        Level::Info => info,
        Level::Warn => red,
        _ => severe,
    }
}

fn console_value(value: &Value) -> String {
    match value {
        Value::String(s) if needs_quote(s) => value.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn needs_quote(s: &str) -> bool {
    s.chars()
        .any(|c| c.is_whitespace() || c.is_control() || c == '"' || c == '\\')
}
