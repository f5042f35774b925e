//! Live clock using the system clock.

use chrono::{DateTime, Utc};

use crate::ports::clock::Clock;

/// Returns the real current time.
pub struct LiveClock;

impl Clock for LiveClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_a_time_between_two_reads() {
        let before = Utc::now();
        let stamped = LiveClock.now();
        assert!(stamped >= before);
        assert!(stamped <= Utc::now());
    }
}
