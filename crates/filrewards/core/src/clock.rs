use chrono::{DateTime, Duration, SubsecRound, Utc};
use std::sync::{Mutex, PoisonError};

/// Issues strictly increasing creation timestamps at microsecond precision.
///
/// Keyset cursors compare timestamps with strict inequality, so two records
/// written by this process must never share one. Microseconds match what
/// PostgreSQL `TIMESTAMPTZ` stores, so a cursor read back from the store
/// compares equal to the value that was written.
#[derive(Debug, Default)]
pub struct MonotonicClock {
    last: Mutex<Option<DateTime<Utc>>>,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> DateTime<Utc> {
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = Utc::now().trunc_subsecs(6);
        if let Some(previous) = *last {
            if next <= previous {
                next = previous + Duration::microseconds(1);
            }
        }
        *last = Some(next);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_are_strictly_increasing() {
        let clock = MonotonicClock::new();
        let mut previous = clock.now();
        for _ in 0..1_000 {
            let next = clock.now();
            assert!(next > previous);
            assert_eq!(next.timestamp_subsec_nanos() % 1_000, 0);
            previous = next;
        }
    }
}
