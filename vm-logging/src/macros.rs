//! Call-shape macros over the level functions.
//!
//! Each trailing argument may be any `Serialize` value:
//!
//! ```
//! vm_logging::info!("got %d items", 5);
//! vm_logging::info!("user event", "user", "alice", "action", "login");
//! vm_logging::warn!("plain");
//! ```

/// Build the argument slice for the `Logger` methods: `args!["user", "alice"]`.
#[macro_export]
macro_rules! args {
    ($($arg:expr),* $(,)?) => {
        [$($crate::arg(&$arg)),*]
    };
}

#[macro_export]
macro_rules! debug {
    ($msg:expr $(, $arg:expr)* $(,)?) => {
        $crate::debug($msg, &$crate::args![$($arg),*])
    };
}

#[macro_export]
macro_rules! info {
    ($msg:expr $(, $arg:expr)* $(,)?) => {
        $crate::info($msg, &$crate::args![$($arg),*])
    };
}

#[macro_export]
macro_rules! warn {
    ($msg:expr $(, $arg:expr)* $(,)?) => {
        $crate::warn($msg, &$crate::args![$($arg),*])
    };
}

/// `error!(err, "message", args...)` where `err` is an `Option<&dyn Error>`.
#[macro_export]
macro_rules! error {
    ($err:expr, $msg:expr $(, $arg:expr)* $(,)?) => {
        $crate::error($err, $msg, &$crate::args![$($arg),*])
    };
}

/// Like [`error!`], then exits the process with status 1.
#[macro_export]
macro_rules! fatal {
    ($err:expr, $msg:expr $(, $arg:expr)* $(,)?) => {
        $crate::fatal($err, $msg, &$crate::args![$($arg),*])
    };
}
