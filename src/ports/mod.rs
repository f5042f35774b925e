//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the linking core and the host
//! it runs inside (world state, rule registry, time, storage, IDs, logs).
//! Implementations live in `src/adapters/` and `src/world/`.

pub mod clock;
pub mod devices;
pub mod filesystem;
pub mod id_gen;
pub mod log;
pub mod rules;

pub use clock::Clock;
pub use devices::DeviceView;
pub use filesystem::FileSystem;
pub use id_gen::IdGenerator;
pub use log::{EventLog, Level};
pub use rules::RuleCatalog;
