//! Persisted data model for one reminder.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Smallest configurable interval.
pub const MIN_INTERVAL_DAYS: u32 = 1;
/// Largest configurable interval and largest countdown value.
pub const MAX_DAYS: u32 = 365;

const ENTITY_PREFIX: &str = "number.recurring_reminders_";

/// Derive the stable identity for a reminder name.
///
/// Lowercases the trimmed name and replaces spaces and hyphens with
/// underscores, so `"Water Plants"`, `"water-plants"` and `"WATER PLANTS"`
/// all map to `water_plants`.
pub fn normalize_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

/// Legacy entity key of the countdown value, e.g. `number.recurring_reminders_water_plants_countdown`.
pub fn countdown_entity_id(identity: &str) -> String {
    format!("{ENTITY_PREFIX}{identity}_countdown")
}

/// Legacy entity key of the interval value.
pub fn interval_entity_id(identity: &str) -> String {
    format!("{ENTITY_PREFIX}{identity}_interval")
}

/// Extract the identity from a legacy entity key, if `reference` is one.
pub fn identity_from_entity_id(reference: &str) -> Option<&str> {
    let rest = reference.strip_prefix(ENTITY_PREFIX)?;
    rest.strip_suffix("_countdown")
        .or_else(|| rest.strip_suffix("_interval"))
        .filter(|id| !id.is_empty())
}

pub fn validate_interval(value: i64) -> Result<u32, ValidationError> {
    check_range("interval_days", value, MIN_INTERVAL_DAYS, MAX_DAYS)
}

pub fn validate_days(value: i64) -> Result<u32, ValidationError> {
    check_range("days_remaining", value, 0, MAX_DAYS)
}

fn check_range(field: &'static str, value: i64, min: u32, max: u32) -> Result<u32, ValidationError> {
    if value < i64::from(min) || value > i64::from(max) {
        return Err(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    // In range, so the narrowing is lossless.
    Ok(value as u32)
}

/// One reminder as it is held in memory and persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderRecord {
    #[serde(skip)]
    pub identity: String,
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub interval_days: u32,
    pub days_remaining: u32,
    pub last_updated: DateTime<FixedOffset>,
}

impl ReminderRecord {
    /// Build a fresh record: the countdown starts at the full interval.
    pub fn new(
        name: &str,
        display_name: Option<String>,
        interval_days: u32,
        now: DateTime<FixedOffset>,
    ) -> Result<Self, ValidationError> {
        let identity = normalize_name(name);
        if identity.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        let interval_days = validate_interval(i64::from(interval_days))?;
        Ok(Self {
            identity,
            name: name.trim().to_string(),
            display_name: display_name.filter(|d| !d.trim().is_empty()),
            interval_days,
            days_remaining: interval_days,
            last_updated: now,
        })
    }

    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    pub fn is_due(&self) -> bool {
        self.days_remaining == 0
    }

    pub fn status(&self) -> DueStatus {
        DueStatus::from_days(self.days_remaining)
    }

    pub fn snapshot(&self) -> ReminderSnapshot {
        ReminderSnapshot {
            identity: self.identity.clone(),
            name: self.name.clone(),
            display_name: self.display_name().to_string(),
            interval_days: self.interval_days,
            days_remaining: self.days_remaining,
            last_updated: self.last_updated,
            is_due: self.is_due(),
            status: self.status(),
            countdown_entity_id: countdown_entity_id(&self.identity),
            interval_entity_id: interval_entity_id(&self.identity),
        }
    }
}

/// Coarse due state derived from the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DueStatus {
    Due,
    /// One day left.
    DueSoon,
    Pending,
}

impl DueStatus {
    pub fn from_days(days_remaining: u32) -> Self {
        match days_remaining {
            0 => DueStatus::Due,
            1 => DueStatus::DueSoon,
            _ => DueStatus::Pending,
        }
    }
}

/// Read-only view handed to presentation layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderSnapshot {
    pub identity: String,
    pub name: String,
    pub display_name: String,
    pub interval_days: u32,
    pub days_remaining: u32,
    pub last_updated: DateTime<FixedOffset>,
    pub is_due: bool,
    pub status: DueStatus,
    pub countdown_entity_id: String,
    pub interval_entity_id: String,
}
