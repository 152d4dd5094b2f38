//! In-memory registry of all active reminders.
//!
//! The registry is the single source of truth: the tick scheduler, the
//! command handlers and presentation layers all go through it. Mutations take
//! `&mut self`, so one registry value serializes every operation; share it
//! across tasks behind a `Mutex` (see [`SharedRegistry`]).
//!
//! Every mutation follows the same order:
//!
//! ```text
//! validate -> build new record -> store.save -> replace in memory -> publish Event
//! ```
//!
//! A failed save therefore leaves the in-memory record untouched and
//! consistent with the store, and observers never see unsaved state.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::clock::Clock;
use crate::error::{ErrorReport, ReminderError, Result};
use crate::events::{Event, ReminderObserver};
use crate::reminder::{self, validate_days, validate_interval, ReminderRecord, ReminderSnapshot};
use crate::storage::{RegistryConfig, ReminderStore};

/// Registry shared between the scheduler task and command callers.
pub type SharedRegistry = Arc<Mutex<ReminderRegistry>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryOptions {
    /// Reconcile records lazily on every read. When off, reads may return a
    /// countdown that is stale until the next scheduled tick.
    pub catch_up_on_read: bool,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            catch_up_on_read: true,
        }
    }
}

impl From<&RegistryConfig> for RegistryOptions {
    fn from(config: &RegistryConfig) -> Self {
        Self {
            catch_up_on_read: config.catch_up_on_read,
        }
    }
}

/// Per-record result of a reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TickStatus {
    Unchanged,
    Decayed {
        from: u32,
        to: u32,
        elapsed_days: i64,
    },
}

#[derive(Debug)]
pub struct TickOutcome {
    pub identity: String,
    pub result: Result<TickStatus>,
}

/// Aggregated result of [`ReminderRegistry::tick_all`].
///
/// One failing record never stops the others; its error is kept here.
#[derive(Debug)]
pub struct TickReport {
    pub at: DateTime<FixedOffset>,
    pub outcomes: Vec<TickOutcome>,
}

impl TickReport {
    pub fn decayed(&self) -> impl Iterator<Item = (&str, TickStatus)> {
        self.outcomes.iter().filter_map(|o| match o.result {
            Ok(status @ TickStatus::Decayed { .. }) => Some((o.identity.as_str(), status)),
            _ => None,
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &ReminderError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.identity.as_str(), e)))
    }

    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }

    pub fn summary(&self) -> TickSummary {
        let mut summary = TickSummary {
            at: self.at,
            decayed: Vec::new(),
            unchanged: 0,
            failed: Vec::new(),
        };
        for outcome in &self.outcomes {
            match &outcome.result {
                Ok(TickStatus::Unchanged) => summary.unchanged += 1,
                Ok(TickStatus::Decayed {
                    from,
                    to,
                    elapsed_days,
                }) => summary.decayed.push(DecaySummary {
                    identity: outcome.identity.clone(),
                    from: *from,
                    to: *to,
                    elapsed_days: *elapsed_days,
                }),
                Err(e) => summary.failed.push(FailureSummary {
                    identity: outcome.identity.clone(),
                    error: ErrorReport::from(e),
                }),
            }
        }
        summary
    }
}

/// Serializable view of a [`TickReport`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickSummary {
    pub at: DateTime<FixedOffset>,
    pub decayed: Vec<DecaySummary>,
    pub unchanged: usize,
    pub failed: Vec<FailureSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecaySummary {
    pub identity: String,
    pub from: u32,
    pub to: u32,
    pub elapsed_days: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureSummary {
    pub identity: String,
    #[serde(flatten)]
    pub error: ErrorReport,
}

pub struct ReminderRegistry {
    store: Box<dyn ReminderStore>,
    clock: Arc<dyn Clock>,
    records: BTreeMap<String, ReminderRecord>,
    observers: Vec<Box<dyn ReminderObserver>>,
    options: RegistryOptions,
}

impl ReminderRegistry {
    /// Load every persisted reminder and bring it up to date.
    ///
    /// The startup catch-up applies whatever days passed while the process
    /// was not running. Per-record failures are logged and leave that record
    /// at its stored value.
    ///
    /// # Errors
    /// Returns an error if the store cannot be listed.
    pub fn open(
        store: impl ReminderStore + 'static,
        clock: Arc<dyn Clock>,
        options: RegistryOptions,
    ) -> Result<Self> {
        let records = store.load_all()?;
        let mut registry = Self {
            store: Box::new(store),
            clock,
            records: records
                .into_iter()
                .map(|r| (r.identity.clone(), r))
                .collect(),
            observers: Vec::new(),
            options,
        };
        info!(count = registry.records.len(), "loaded reminders");
        if !registry.options.catch_up_on_read {
            warn!("read-time catch-up disabled, reads can be stale until the next tick");
        }

        let report = registry.tick_all(registry.clock.now());
        for (identity, err) in report.failures() {
            warn!(identity, error = %err, "startup catch-up failed");
        }
        Ok(registry)
    }

    /// Wrap into the shared form used by the scheduler.
    pub fn into_shared(self) -> SharedRegistry {
        Arc::new(Mutex::new(self))
    }

    pub fn now(&self) -> DateTime<FixedOffset> {
        self.clock.now()
    }

    pub fn options(&self) -> RegistryOptions {
        self.options
    }

    /// Register an observer. It receives every event published after this call.
    pub fn subscribe(&mut self, observer: impl ReminderObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.records.contains_key(identity)
    }

    pub fn identities(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Create a reminder whose countdown starts at `interval_days`.
    ///
    /// # Errors
    /// `DuplicateName` when the normalized name is taken, `Validation` for an
    /// empty name or out-of-range interval, `Persistence` if the save fails.
    pub fn create(&mut self, name: &str, interval_days: i64) -> Result<ReminderSnapshot> {
        self.create_with_display_name(name, None, interval_days)
    }

    pub fn create_with_display_name(
        &mut self,
        name: &str,
        display_name: Option<String>,
        interval_days: i64,
    ) -> Result<ReminderSnapshot> {
        let interval_days = validate_interval(interval_days)?;
        let record = ReminderRecord::new(name, display_name, interval_days, self.clock.now())?;
        if self.records.contains_key(&record.identity) {
            return Err(ReminderError::DuplicateName {
                name: name.trim().to_string(),
                identity: record.identity,
            });
        }

        let event = Event::ReminderCreated {
            reminder: record.snapshot(),
        };
        let snapshot = self.commit(record, event)?;
        info!(identity = %snapshot.identity, interval_days, "reminder created");
        Ok(snapshot)
    }

    /// Restart the countdown at the configured interval.
    ///
    /// Always persists, even when the value is unchanged, to refresh
    /// `last_updated`.
    pub fn reset(&mut self, identity: &str) -> Result<ReminderSnapshot> {
        let now = self.clock.now();
        let mut record = self.record(identity)?.clone();
        record.days_remaining = record.interval_days;
        record.last_updated = now;

        let event = Event::CountdownReset {
            identity: record.identity.clone(),
            days_remaining: record.days_remaining,
            at: now,
        };
        let snapshot = self.commit(record, event)?;
        info!(identity, days_remaining = snapshot.days_remaining, "countdown reset");
        Ok(snapshot)
    }

    /// Override the countdown. Values above the interval are kept as given.
    pub fn set_days(&mut self, identity: &str, value: i64) -> Result<ReminderSnapshot> {
        let days = validate_days(value)?;
        let now = self.clock.now();
        let mut record = self.record(identity)?.clone();
        let from = record.days_remaining;
        record.days_remaining = days;
        record.last_updated = now;

        let event = Event::DaysSet {
            identity: record.identity.clone(),
            from,
            to: days,
            at: now,
        };
        let snapshot = self.commit(record, event)?;
        info!(identity, from, to = days, "countdown set manually");
        Ok(snapshot)
    }

    /// Change the reset target. The running countdown is left alone.
    pub fn set_interval(&mut self, identity: &str, value: i64) -> Result<ReminderSnapshot> {
        let interval = validate_interval(value)?;
        let mut record = self.record(identity)?.clone();
        let from = record.interval_days;
        record.interval_days = interval;

        let event = Event::IntervalChanged {
            identity: record.identity.clone(),
            from,
            to: interval,
        };
        let snapshot = self.commit(record, event)?;
        info!(identity, from, to = interval, "interval updated");
        Ok(snapshot)
    }

    /// Delete the reminder and its persisted document.
    pub fn remove(&mut self, identity: &str) -> Result<ReminderSnapshot> {
        let snapshot = self.record(identity)?.snapshot();
        self.store.delete(identity)?;
        self.records.remove(identity);
        self.publish(&Event::ReminderRemoved {
            identity: identity.to_string(),
        });
        info!(identity, "reminder removed");
        Ok(snapshot)
    }

    /// Reconcile every reminder against `now`.
    ///
    /// Only records whose countdown value changed are persisted and
    /// published. Calling this twice on the same day is a no-op the second
    /// time.
    pub fn tick_all(&mut self, now: DateTime<FixedOffset>) -> TickReport {
        let identities: Vec<String> = self.records.keys().cloned().collect();
        let outcomes: Vec<TickOutcome> = identities
            .into_iter()
            .map(|identity| {
                let result = self.catch_up(&identity, now);
                if let Err(e) = &result {
                    error!(identity = %identity, error = %e, "countdown update failed");
                }
                TickOutcome { identity, result }
            })
            .collect();

        let report = TickReport { at: now, outcomes };
        debug!(
            total = report.outcomes.len(),
            decayed = report.decayed().count(),
            "tick complete"
        );
        report
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Current record, caught up to today when read-time catch-up is on.
    ///
    /// # Errors
    /// `NotFound` for an unknown identity; `Persistence` if the catch-up
    /// could not be saved (the stale value is never handed out).
    pub fn get(&mut self, identity: &str) -> Result<ReminderRecord> {
        self.read(identity)?;
        self.record(identity).cloned()
    }

    pub fn snapshot(&mut self, identity: &str) -> Result<ReminderSnapshot> {
        self.read(identity)?;
        Ok(self.record(identity)?.snapshot())
    }

    /// Snapshots of every reminder, ordered by identity.
    pub fn list(&mut self) -> Result<Vec<ReminderSnapshot>> {
        let identities: Vec<String> = self.records.keys().cloned().collect();
        identities
            .iter()
            .map(|identity| self.snapshot(identity))
            .collect()
    }

    /// Reminders whose countdown reached zero.
    pub fn due(&mut self) -> Result<Vec<ReminderSnapshot>> {
        Ok(self.list()?.into_iter().filter(|s| s.is_due).collect())
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn record(&self, identity: &str) -> Result<&ReminderRecord> {
        self.records
            .get(identity)
            .ok_or_else(|| ReminderError::NotFound(identity.to_string()))
    }

    fn read(&mut self, identity: &str) -> Result<()> {
        if self.options.catch_up_on_read {
            let now = self.clock.now();
            self.catch_up(identity, now)?;
        } else {
            self.record(identity)?;
        }
        Ok(())
    }

    /// Reconcile one record and commit it if the value moved.
    fn catch_up(&mut self, identity: &str, now: DateTime<FixedOffset>) -> Result<TickStatus> {
        let current = self.record(identity)?;
        let outcome = reminder::reconcile(current, now);
        if !outcome.value_changed() {
            debug!(identity, elapsed_days = outcome.elapsed_days, "countdown unchanged");
            return Ok(TickStatus::Unchanged);
        }

        let mut record = current.clone();
        reminder::apply(&mut record, &outcome);
        let event = Event::CountdownDecayed {
            identity: identity.to_string(),
            from: outcome.previous_days,
            to: outcome.days_remaining,
            elapsed_days: outcome.elapsed_days,
            at: now,
        };
        self.commit(record, event)?;
        info!(
            identity,
            from = outcome.previous_days,
            to = outcome.days_remaining,
            elapsed_days = outcome.elapsed_days,
            "countdown decayed"
        );
        Ok(TickStatus::Decayed {
            from: outcome.previous_days,
            to: outcome.days_remaining,
            elapsed_days: outcome.elapsed_days,
        })
    }

    fn commit(&mut self, record: ReminderRecord, event: Event) -> Result<ReminderSnapshot> {
        self.store.save(&record)?;
        let snapshot = record.snapshot();
        self.records.insert(record.identity.clone(), record);
        self.publish(&event);
        Ok(snapshot)
    }

    fn publish(&self, event: &Event) {
        for observer in &self.observers {
            observer.on_event(event);
        }
    }
}
