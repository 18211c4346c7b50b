//! Scoring clock — the single source of "now" for a scoring pass.
//!
//! RULE: Nothing in the engine reads the wall clock directly.
//! A batch captures one instant from a `Clock` and every customer
//! in that batch is scored against it.

use crate::types::Days;
use chrono::{DateTime, Duration, Utc};

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Reads the system clock. Used by the runner binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant. Used in tests and for replaying
/// a batch "as of" a past date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    instant: DateTime<Utc>,
}

impl FixedClock {
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self { instant }
    }

    /// A clock `days` after this one.
    pub fn advanced_by(&self, days: Days) -> Self {
        Self { instant: self.instant + Duration::days(days) }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.instant
    }
}

/// Whole days elapsed from `earlier` to `now`, truncated toward zero.
/// Negative when `earlier` lies after `now`.
pub fn whole_days_between(earlier: DateTime<Utc>, now: DateTime<Utc>) -> Days {
    (now - earlier).num_days()
}
