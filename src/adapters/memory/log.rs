//! Capturing event log.

use std::sync::{Mutex, PoisonError};

use crate::ports::log::{EventLog, Level};

/// Keeps every recorded event in memory.
#[derive(Default)]
pub struct MemoryLog {
    entries: Mutex<Vec<(Level, String)>>,
}

impl MemoryLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all recorded events.
    #[must_use]
    pub fn entries(&self) -> Vec<(Level, String)> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Returns the messages recorded at exactly `level`.
    #[must_use]
    pub fn messages_at(&self, level: Level) -> Vec<String> {
        self.entries().into_iter().filter(|(l, _)| *l == level).map(|(_, m)| m).collect()
    }

    /// Counts recorded messages at `level` containing `needle`.
    #[must_use]
    pub fn count_containing(&self, level: Level, needle: &str) -> usize {
        self.messages_at(level).iter().filter(|m| m.contains(needle)).count()
    }
}

impl EventLog for MemoryLog {
    fn record(&self, level: Level, message: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((level, message.to_string()));
    }
}
