//! Countdown reconciliation.
//!
//! The engine is a pure function of `(record, now)`. It does not keep time
//! itself - the caller decides when to reconcile (scheduled tick, read-time
//! catch-up, or both).
//!
//! ## Decay rule
//!
//! ```text
//! elapsed = date(now) - date(last_updated)     // calendar days, not hours
//! elapsed <= 0  -> unchanged
//! elapsed  > 0  -> days_remaining = max(0, days_remaining - elapsed)
//!                  last_updated   = now
//! ```
//!
//! Only `(now, last_updated)` matters, so a process that was offline for
//! five days applies one five-day decrement on its next reconciliation.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::record::ReminderRecord;

/// Number of calendar-day boundaries between `earlier` and `later`.
///
/// Each timestamp contributes its date in its own UTC offset. Negative when
/// `later` falls on an earlier date.
pub fn calendar_day_difference(later: DateTime<FixedOffset>, earlier: DateTime<FixedOffset>) -> i64 {
    (later.date_naive() - earlier.date_naive()).num_days()
}

/// Outcome of one reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    pub elapsed_days: i64,
    pub previous_days: u32,
    pub days_remaining: u32,
    pub last_updated: DateTime<FixedOffset>,
}

impl Reconciliation {
    /// True when the countdown value moved.
    pub fn value_changed(&self) -> bool {
        self.days_remaining != self.previous_days
    }

    /// True when a day boundary was crossed, even if the value was already 0.
    pub fn advanced(&self) -> bool {
        self.elapsed_days > 0
    }
}

/// Compute the reconciled countdown for `record` at `now`. No side effects.
pub fn reconcile(record: &ReminderRecord, now: DateTime<FixedOffset>) -> Reconciliation {
    let elapsed_days = calendar_day_difference(now, record.last_updated);
    if elapsed_days <= 0 {
        return Reconciliation {
            elapsed_days,
            previous_days: record.days_remaining,
            days_remaining: record.days_remaining,
            last_updated: record.last_updated,
        };
    }

    let decayed = i64::from(record.days_remaining) - elapsed_days;
    Reconciliation {
        elapsed_days,
        previous_days: record.days_remaining,
        // Floored at zero and bounded above by the previous value.
        days_remaining: decayed.max(0) as u32,
        last_updated: now,
    }
}

/// Apply a reconciliation to a record, updating both fields together.
pub fn apply(record: &mut ReminderRecord, outcome: &Reconciliation) {
    record.days_remaining = outcome.days_remaining;
    record.last_updated = outcome.last_updated;
}
