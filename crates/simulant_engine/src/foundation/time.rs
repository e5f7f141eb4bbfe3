//! Identity and time utilities for simulants

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Produce a process-unique simulant id
pub fn make_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Milliseconds since the UNIX epoch, used as a creation time stamp
pub fn time_stamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
}

/// Discrete simulation clock measured in ticks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TickTime(pub u64);

impl TickTime {
    /// The first tick
    pub const ZERO: Self = Self(0);

    /// Advance by one tick
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Ticks elapsed since `earlier` (saturating)
    pub fn since(self, earlier: Self) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let a = make_id();
        let b = make_id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_tick_time_since() {
        let start = TickTime(3);
        assert_eq!(TickTime(10).since(start), 7);
        assert_eq!(TickTime(1).since(start), 0);
        assert_eq!(start.next(), TickTime(4));
    }
}
