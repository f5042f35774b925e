//! Live event log writing to stderr.

use crate::ports::log::{EventLog, Level};

/// Writes events at or above a minimum level to stderr.
pub struct StderrLog {
    min_level: Level,
}

impl StderrLog {
    /// Creates a log that drops events below `min_level`.
    #[must_use]
    pub fn new(min_level: Level) -> Self {
        Self { min_level }
    }
}

impl Default for StderrLog {
    fn default() -> Self {
        Self::new(Level::Warn)
    }
}

impl EventLog for StderrLog {
    fn record(&self, level: Level, message: &str) {
        if self.enabled(level) {
            eprintln!("[{level}] {message}");
        }
    }

    fn enabled(&self, level: Level) -> bool {
        level >= self.min_level
    }
}
