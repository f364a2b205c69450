//! Process-wide structured logging for VM Tool
//!
//! One logger is shared by the whole program. It is configured once with
//! [`initialize`] and used from anywhere through the level functions, which
//! accept either printf-style values or key/value pairs after the message:
//!
//! ```
//! use vm_logging::{Config, SharedBuffer};
//!
//! let buffer = SharedBuffer::new();
//! vm_logging::initialize(Config::default().output(Box::new(buffer.clone())));
//!
//! vm_logging::info!("got %d items", 5);
//! vm_logging::info!("user event", "user", "alice");
//!
//! let db = vm_logging::get_logger("db");
//! db.warn("slow query", &vm_logging::args!["ms", 1200]);
//!
//! assert_eq!(buffer.lines().len(), 3);
//! ```
//!
//! Logging before `initialize` is fine: events go to stderr as compact JSON at
//! `info`. Records from the `log` crate are routed through the same handle
//! once initialized, and [`FacadeLayer`] does the same for `tracing`.

pub mod args;
pub mod bridge;
pub mod caller;
pub mod config;
pub mod error;
pub mod global;
pub mod level;
pub mod logger;
mod macros;
pub mod printf;
mod render;
pub mod sink;

pub use args::{arg, process_args, Args};
pub use bridge::{FacadeLayer, LogBridge};
pub use caller::CallSite;
pub use config::{Config, TimeFormat, DEFAULT_TIME_FORMAT};
pub use error::{LogError, Result};
pub use global::{
    caller_enabled, current, debug, error, fatal, format_error, get_logger, info, initialize,
    is_initialized, min_level, warn, with_field,
};
pub use level::Level;
pub use logger::{Event, Format, Logger};
#[cfg(any(test, feature = "test-helpers"))]
pub use sink::SharedBuffer;
pub use sink::Sink;
