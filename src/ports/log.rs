//! Event log port for diagnostics.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Severity of a logged event, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Per-mutation detail.
    Debug,
    /// Lifecycle summaries such as load counts.
    Info,
    /// Recoverable faults the user may want to know about.
    Warn,
    /// Faults contained at a boundary.
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        };
        f.write_str(name)
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            other => Err(format!("Unknown log level '{other}'")),
        }
    }
}

/// Receives diagnostic events.
///
/// Abstracting the sink lets tests assert on what was reported and lets a
/// host route messages into its own logger.
pub trait EventLog: Send + Sync {
    /// Records a single event.
    fn record(&self, level: Level, message: &str);

    /// Returns `true` if events at `level` would be kept. Callers on hot
    /// paths check this before formatting a message.
    fn enabled(&self, _level: Level) -> bool {
        true
    }

    /// Records a debug event.
    fn debug(&self, message: &str) {
        self.record(Level::Debug, message);
    }

    /// Records an info event.
    fn info(&self, message: &str) {
        self.record(Level::Info, message);
    }

    /// Records a warning.
    fn warn(&self, message: &str) {
        self.record(Level::Warn, message);
    }

    /// Records an error.
    fn error(&self, message: &str) {
        self.record(Level::Error, message);
    }
}

impl<T: EventLog + ?Sized> EventLog for Arc<T> {
    fn record(&self, level: Level, message: &str) {
        (**self).record(level, message);
    }

    fn enabled(&self, level: Level) -> bool {
        (**self).enabled(level)
    }
}
