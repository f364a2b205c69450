//! Interpretation of the trailing arguments of a logging call.
//!
//! One call shape serves both printf-style and structured logging:
//!
//! ```
//! # use vm_logging::Args;
//! # use serde_json::json;
//! // `%` in the template: positional substitution.
//! assert!(matches!(Args::interpret("got %d items", &[json!(5)]), Args::Formatted(_)));
//! // No `%`: alternating key/value pairs.
//! assert!(matches!(
//!     Args::interpret("user event", &[json!("user"), json!("alice")]),
//!     Args::Fielded(_)
//! ));
//! // Nothing trailing: the template is the message.
//! assert!(matches!(Args::interpret("plain", &[]), Args::None));
//! ```
//!
//! A key without a value (odd-length list) is dropped. Callers that do not
//! want the `%` sniffing can build [`Args::Formatted`] or [`Args::Fielded`]
//! directly.

use serde::Serialize;
use serde_json::Value;

use crate::logger::Event;
use crate::printf;

#[derive(Debug, Clone, PartialEq)]
pub enum Args {
    /// The template is emitted verbatim.
    None,
    /// Values substituted into the template's `%` verbs.
    Formatted(Vec<Value>),
    /// Fields attached in order; the template is emitted verbatim.
    Fielded(Vec<(String, Value)>),
}

impl Args {
    /// Pick the interpretation for `values`, in this order:
    ///
    /// 1. non-empty and the template contains `%` -> `Formatted`
    /// 2. non-empty -> `Fielded`
    /// 3. otherwise -> `None`
    pub fn interpret(template: &str, values: &[Value]) -> Self {
        if !values.is_empty() && template.contains('%') {
            Args::Formatted(values.to_vec())
        } else if !values.is_empty() {
            Args::Fielded(pairs(values))
        } else {
            Args::None
        }
    }

    pub fn formatted(values: Vec<Value>) -> Self {
        Args::Formatted(values)
    }

    pub fn fielded<K: Into<String>>(pairs: impl IntoIterator<Item = (K, Value)>) -> Self {
        Args::Fielded(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Render the message for `template` under this interpretation.
    pub fn message(&self, template: &str) -> String {
        match self {
            Args::Formatted(values) => printf::sprintf(template, values),
            Args::None | Args::Fielded(_) => template.to_string(),
        }
    }
}

/// Group `values` as `(key, value)` pairs, dropping an unpaired last element.
pub fn pairs(values: &[Value]) -> Vec<(String, Value)> {
    values
        .chunks_exact(2)
        .map(|pair| (key_string(&pair[0]), pair[1].clone()))
        .collect()
}

/// String form of a key: strings as-is, anything else as its plain rendering.
pub fn key_string(key: &Value) -> String {
    printf::plain(key)
}

/// Convert any serializable value into a logging argument.
///
/// A value that fails to serialize becomes the text of the failure, so the
/// event is still emitted.
pub fn arg<T: Serialize + ?Sized>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|e| Value::String(format!("!ERROR: {e}")))
}

/// Finalize `event` with `template` and the interpreted `values`, then emit it.
pub fn process_args(event: Event<'_>, template: &str, values: &[Value]) {
    event.finish(template, Args::interpret(template, values));
}
