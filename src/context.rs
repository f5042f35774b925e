//! Service context bundling all port trait objects.

use crate::adapters::live::{LiveClock, LiveFileSystem, LiveIdGenerator, StderrLog};
use crate::adapters::memory::{FixedClock, MemoryFileSystem, MemoryLog, SequentialIdGenerator};
use crate::ports::clock::Clock;
use crate::ports::filesystem::FileSystem;
use crate::ports::id_gen::IdGenerator;
use crate::ports::log::{EventLog, Level};

/// Bundles the port trait objects the linking core depends on.
///
/// Each field provides access to one external boundary. Constructors
/// wire up live or in-memory adapters; individual fields can be replaced
/// afterwards.
pub struct ServiceContext {
    /// Clock for stamping saved stores.
    pub clock: Box<dyn Clock>,
    /// Filesystem for store and world file I/O.
    pub fs: Box<dyn FileSystem>,
    /// ID generator for new link groups.
    pub id_gen: Box<dyn IdGenerator>,
    /// Diagnostics sink.
    pub log: Box<dyn EventLog>,
}

impl ServiceContext {
    /// Creates a live context: system clock, real disk, UUIDs and a stderr
    /// log filtered at `log_level`.
    #[must_use]
    pub fn live(log_level: Level) -> Self {
        Self {
            clock: Box::new(LiveClock),
            fs: Box::new(LiveFileSystem),
            id_gen: Box::new(LiveIdGenerator),
            log: Box::new(StderrLog::new(log_level)),
        }
    }

    /// Creates a fully deterministic in-memory context.
    ///
    /// Group IDs are `group-1`, `group-2`, ...; the clock is fixed at the
    /// Unix epoch; logged events are kept in memory and discarded with the
    /// context.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            clock: Box::new(FixedClock::default()),
            fs: Box::new(MemoryFileSystem::new()),
            id_gen: Box::new(SequentialIdGenerator::default()),
            log: Box::new(MemoryLog::new()),
        }
    }
}
