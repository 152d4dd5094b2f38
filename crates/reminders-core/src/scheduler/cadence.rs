use std::time::Duration;

use chrono::{DateTime, Days, FixedOffset, NaiveTime, TimeZone};

/// When the tick scheduler fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    /// Every local midnight.
    Midnight,
    /// Every fixed interval, counted from scheduler start.
    Every(Duration),
}

impl Cadence {
    /// First firing time strictly after `after`.
    ///
    /// Midnight is taken in `after`'s own offset. If a DST change makes that
    /// an hour off, the tick still lands on the right date or fires again
    /// shortly after, and reconciliation is idempotent either way.
    pub fn next_fire(&self, after: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
        match self {
            Cadence::Midnight => {
                let tomorrow = after
                    .date_naive()
                    .checked_add_days(Days::new(1))
                    .unwrap_or(after.date_naive());
                let midnight = tomorrow.and_time(NaiveTime::MIN);
                after
                    .offset()
                    .from_local_datetime(&midnight)
                    .single()
                    .unwrap_or(after)
            }
            Cadence::Every(period) => {
                let step = chrono::Duration::from_std(*period)
                    .unwrap_or_else(|_| chrono::Duration::days(1));
                after + step
            }
        }
    }

    /// Wall-clock wait from `now` until the next firing.
    pub fn wait_from(&self, now: DateTime<FixedOffset>) -> Duration {
        (self.next_fire(now) - now).to_std().unwrap_or_default()
    }
}
