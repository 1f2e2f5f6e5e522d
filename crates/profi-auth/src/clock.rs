//! Time source used for every time-based claim check.
//!
//! Services take an `Arc<dyn Clock>` so that expiry windows can be exercised
//! deterministically in tests with [`ManualClock`].

use std::sync::atomic::{AtomicI64, Ordering};

use time::{Duration, OffsetDateTime};

/// Source of the current instant.
pub trait Clock: Send + Sync {
    /// Returns the current UTC instant.
    fn now(&self) -> OffsetDateTime;

    /// Returns the current Unix timestamp in seconds.
    fn unix_now(&self) -> i64 {
        self.now().unix_timestamp()
    }
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// A clock that only moves when told to.
///
/// Resolution is one second, which matches the resolution of JWT
/// numeric dates.
#[derive(Debug)]
pub struct ManualClock {
    unix: AtomicI64,
}

impl ManualClock {
    /// Creates a clock frozen at the given instant.
    #[must_use]
    pub fn new(at: OffsetDateTime) -> Self {
        Self {
            unix: AtomicI64::new(at.unix_timestamp()),
        }
    }

    /// Creates a clock frozen at the current wall-clock time.
    #[must_use]
    pub fn starting_now() -> Self {
        Self::new(OffsetDateTime::now_utc())
    }

    /// Moves the clock to an absolute instant.
    pub fn set(&self, at: OffsetDateTime) {
        self.unix.store(at.unix_timestamp(), Ordering::SeqCst);
    }

    /// Moves the clock forward (or backward, for negative durations).
    pub fn advance(&self, by: Duration) {
        self.unix.fetch_add(by.whole_seconds(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> OffsetDateTime {
        let unix = self.unix.load(Ordering::SeqCst);
        // Only reachable with timestamps outside the year range `time` supports.
        OffsetDateTime::from_unix_timestamp(unix).unwrap_or(OffsetDateTime::UNIX_EPOCH)
    }

    fn unix_now(&self) -> i64 {
        self.unix.load(Ordering::SeqCst)
    }
}
