//! Fixed clock.

use chrono::{DateTime, Utc};

use crate::ports::clock::Clock;

/// A clock that always reports the same instant.
pub struct FixedClock(pub DateTime<Utc>);

impl Default for FixedClock {
    fn default() -> Self {
        Self(DateTime::<Utc>::default())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
