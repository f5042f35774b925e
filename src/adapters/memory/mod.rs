//! Deterministic in-memory adapters.

pub mod clock;
pub mod filesystem;
pub mod id_gen;
pub mod log;

pub use clock::FixedClock;
pub use filesystem::MemoryFileSystem;
pub use id_gen::SequentialIdGenerator;
pub use log::MemoryLog;
