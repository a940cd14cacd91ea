//! Wall-clock gate for signal emission.

use chrono::{DateTime, Timelike, Utc};

/// The trailing seconds of each minute in which signals may be emitted, so
/// entries line up with the next round minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalWindow {
    start_second: u32,
    end_second: u32,
}

impl Default for SignalWindow {
    fn default() -> Self {
        Self {
            start_second: 50,
            end_second: 59,
        }
    }
}

impl SignalWindow {
    pub fn new(start_second: u32, end_second: u32) -> Self {
        Self {
            start_second,
            end_second,
        }
    }

    /// Check whether `now` falls inside the window (both ends inclusive).
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        let second = now.second();
        second >= self.start_second && second <= self.end_second
    }
}

/// Seconds left until the next round minute (1-60).
pub fn seconds_to_next_minute(now: DateTime<Utc>) -> u32 {
    60 - now.second()
}
