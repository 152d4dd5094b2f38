mod countdown;
mod record;

pub use countdown::{apply, calendar_day_difference, reconcile, Reconciliation};
pub use record::{
    countdown_entity_id, identity_from_entity_id, interval_entity_id, normalize_name,
    validate_days, validate_interval, DueStatus, ReminderRecord, ReminderSnapshot, MAX_DAYS,
    MIN_INTERVAL_DAYS,
};
