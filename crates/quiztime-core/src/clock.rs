//! Wall-clock abstraction for session timing.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

/// Source of the current time for sessions.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Reads the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same instant, so a test can keep one handle and advance
/// the clock owned by a session.
#[derive(Debug, Clone)]
pub struct ManualClock {
    millis: Arc<AtomicI64>,
}

impl ManualClock {
    /// A clock fixed at 2023-11-14T22:13:20Z.
    pub fn at_epoch() -> Self {
        Self {
            millis: Arc::new(AtomicI64::new(1_700_000_000_000)),
        }
    }

    pub fn advance(&self, delta: Duration) {
        self.millis
            .fetch_add(delta.num_milliseconds(), Ordering::SeqCst);
    }

    pub fn advance_secs(&self, secs: i64) {
        self.advance(Duration::seconds(secs));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let millis = self.millis.load(Ordering::SeqCst);
        DateTime::<Utc>::from_timestamp_millis(millis).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::at_epoch();
        let handle = clock.clone();
        let start = clock.now();

        handle.advance_secs(90);
        assert_eq!((clock.now() - start).num_seconds(), 90);

        handle.advance(Duration::milliseconds(500));
        assert_eq!((clock.now() - start).num_milliseconds(), 90_500);
    }
}
