use thiserror::Error;

/// Errors produced by the strict (opt-in) parsing paths.
///
/// None of the logging calls return these; the facade itself degrades to
/// defaults instead of failing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LogError {
    #[error(
        "unknown log level '{0}' (expected one of debug, info, warn, error, fatal, panic, disabled)"
    )]
    ParseLevel(String),
}

pub type Result<T> = std::result::Result<T, LogError>;
