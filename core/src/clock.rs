//! Time source. The engine never reads the system clock directly.
//!
//! Idle income and task resets are pure functions of `now()` against
//! stored timestamps, so tests drive a `ManualClock` instead of sleeping.

use crate::types::Timestamp;
use chrono::{Duration, FixedOffset, Local, NaiveDate, Offset, Utc};
use std::sync::Mutex;

pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> Timestamp;

    /// Offset used to decide which calendar day an instant falls on.
    fn local_offset(&self) -> FixedOffset;

    /// Calendar date of `ts` in the local offset.
    fn local_date(&self, ts: Timestamp) -> NaiveDate {
        ts.with_timezone(&self.local_offset()).date_naive()
    }

    fn today(&self) -> NaiveDate {
        self.local_date(self.now())
    }
}

/// Wall clock with the host's local offset.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }

    fn local_offset(&self) -> FixedOffset {
        Local::now().offset().fix()
    }
}

/// Settable clock for tests and replay tooling.
#[derive(Debug)]
pub struct ManualClock {
    now:    Mutex<Timestamp>,
    offset: FixedOffset,
}

impl ManualClock {
    pub fn new(now: Timestamp) -> Self {
        Self::with_offset(now, Utc.fix())
    }

    pub fn with_offset(now: Timestamp, offset: FixedOffset) -> Self {
        Self { now: Mutex::new(now), offset }
    }

    pub fn set(&self, now: Timestamp) {
        *self.lock() = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.lock();
        *now += by;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Timestamp> {
        // A poisoned clock still holds a valid timestamp.
        self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.lock()
    }

    fn local_offset(&self) -> FixedOffset {
        self.offset
    }
}
