//! Port implementations.
//!
//! `live` adapters talk to the real system; `memory` adapters are
//! deterministic and in-process, for tests and embedding hosts.

pub mod live;
pub mod memory;
