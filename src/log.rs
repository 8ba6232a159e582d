//! Logging for the registry and loader.
//!
//! Components never log through a global switch. Each one holds an injected
//! [`Logger`]; the default [`TracingLogger`] forwards to `tracing` when the
//! `tracing` feature is enabled and compiles to nothing otherwise.

use std::fmt;
use std::sync::{Mutex, PoisonError};

#[cfg(feature = "tracing")]
pub use tracing::{debug, warn};

#[cfg(not(feature = "tracing"))]
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
pub use crate::{debug, warn};

/// Severity of a log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Warn,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Debug => write!(f, "debug"),
            Level::Warn => write!(f, "warn"),
        }
    }
}

/// Sink for component diagnostics
pub trait Logger: Send + Sync {
    fn log(&self, level: Level, component: &str, message: &str);

    fn debug(&self, component: &str, message: &str) {
        self.log(Level::Debug, component, message);
    }

    fn warn(&self, component: &str, message: &str) {
        self.log(Level::Warn, component, message);
    }
}

/// Forwards entries to `tracing` (no-op without the `tracing` feature)
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, level: Level, component: &str, message: &str) {
        let _ = (component, message);
        match level {
            Level::Debug => {
                debug!(component, "{}", message);
            }
            Level::Warn => {
                warn!(component, "{}", message);
            }
        }
    }
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn log(&self, _level: Level, _component: &str, _message: &str) {}
}

/// A single captured entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: Level,
    pub component: String,
    pub message: String,
}

/// Keeps every entry in memory, for hosts that surface diagnostics in their own UI.
#[derive(Debug, Default)]
pub struct RecordingLogger {
    entries: Mutex<Vec<LogEntry>>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything logged so far
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Entries at `Warn` level only
    pub fn warnings(&self) -> Vec<LogEntry> {
        self.entries().into_iter().filter(|e| e.level == Level::Warn).collect()
    }
}

impl Logger for RecordingLogger {
    fn log(&self, level: Level, component: &str, message: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(LogEntry {
                level,
                component: component.to_string(),
                message: message.to_string(),
            });
    }
}
