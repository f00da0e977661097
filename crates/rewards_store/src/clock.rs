//! Time source for timestamps and calendar-day comparisons.

use std::sync::RwLock;

use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate, Offset, TimeZone, Utc};

/// Trait for reading the current time.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Calendar day of `at` in the user's time zone.
    fn calendar_day(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&Local).date_naive()
    }

    /// Today's calendar day.
    fn today(&self) -> NaiveDate {
        self.calendar_day(self.now())
    }
}

/// Wall clock using the host's local time zone.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for testing.
///
/// Calendar days are computed in a fixed offset so tests do not depend on
/// the host's time zone.
#[derive(Debug)]
pub struct ManualClock {
    now: RwLock<DateTime<Utc>>,
    offset: FixedOffset,
}

impl ManualClock {
    /// Creates a clock frozen at `now`, with days computed in UTC.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self::with_offset(now, Utc.fix())
    }

    /// Creates a clock frozen at `now` with days computed in `offset`.
    pub fn with_offset(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self {
            now: RwLock::new(now),
            offset,
        }
    }

    /// Moves the clock to `now`.
    pub fn set(&self, now: DateTime<Utc>) {
        if let Ok(mut guard) = self.now.write() {
            *guard = now;
        }
    }

    /// Moves the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        if let Ok(mut guard) = self.now.write() {
            *guard += by;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
            .read()
            .map(|guard| *guard)
            .unwrap_or_else(|e| *e.into_inner())
    }

    fn calendar_day(&self, at: DateTime<Utc>) -> NaiveDate {
        self.offset.from_utc_datetime(&at.naive_utc()).date_naive()
    }
}
