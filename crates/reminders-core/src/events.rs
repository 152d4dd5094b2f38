use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::reminder::ReminderSnapshot;

/// Every state change in the registry produces an Event.
/// Presentation layers subscribe to them through [`ReminderObserver`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    ReminderCreated {
        reminder: ReminderSnapshot,
    },
    /// Automatic decay, from a scheduled tick or a read-time catch-up.
    CountdownDecayed {
        identity: String,
        from: u32,
        to: u32,
        elapsed_days: i64,
        at: DateTime<FixedOffset>,
    },
    CountdownReset {
        identity: String,
        days_remaining: u32,
        at: DateTime<FixedOffset>,
    },
    /// Manual override of the countdown value.
    DaysSet {
        identity: String,
        from: u32,
        to: u32,
        at: DateTime<FixedOffset>,
    },
    IntervalChanged {
        identity: String,
        from: u32,
        to: u32,
    },
    ReminderRemoved {
        identity: String,
    },
}

impl Event {
    pub fn identity(&self) -> &str {
        match self {
            Event::ReminderCreated { reminder } => &reminder.identity,
            Event::CountdownDecayed { identity, .. }
            | Event::CountdownReset { identity, .. }
            | Event::DaysSet { identity, .. }
            | Event::IntervalChanged { identity, .. }
            | Event::ReminderRemoved { identity } => identity,
        }
    }
}

/// Receives registry events after they have been persisted.
pub trait ReminderObserver: Send {
    fn on_event(&self, event: &Event);
}

impl<F> ReminderObserver for F
where
    F: Fn(&Event) + Send,
{
    fn on_event(&self, event: &Event) {
        self(event)
    }
}
