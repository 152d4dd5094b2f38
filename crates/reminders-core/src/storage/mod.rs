mod config;
pub mod database;
pub mod memory;

pub use config::{CadenceKind, Config, LogConfig, RegistryConfig, SchedulerConfig};
pub use database::SqliteStore;
pub use memory::MemoryStore;

use std::path::PathBuf;

use chrono::{DateTime, FixedOffset};

use crate::error::{ReminderError, StoreError};
use crate::reminder::{normalize_name, validate_days, validate_interval, ReminderRecord};

/// Returns the data directory, creating it if needed.
///
/// `REMINDERS_DATA_DIR` wins when set. Otherwise `~/.config/recurring-reminders[-dev]/`
/// based on REMINDERS_ENV (set REMINDERS_ENV=dev for a development directory).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StoreError> {
    let dir = match std::env::var_os("REMINDERS_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("REMINDERS_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("recurring-reminders-dev")
            } else {
                base_dir.join("recurring-reminders")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StoreError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

/// Durable per-reminder document store.
///
/// Implementations must make `save` atomic: a concurrent reader sees either
/// the previous document or the new one, never a mix.
pub trait ReminderStore: Send {
    /// Load one record, `None` when nothing is stored under `identity`.
    fn load(&self, identity: &str) -> Result<Option<ReminderRecord>, StoreError>;

    /// Load every stored record, ordered by identity.
    fn load_all(&self) -> Result<Vec<ReminderRecord>, StoreError>;

    /// Overwrite the stored document for `record.identity`.
    fn save(&self, record: &ReminderRecord) -> Result<(), StoreError>;

    /// Remove the stored document. Missing records are not an error.
    fn delete(&self, identity: &str) -> Result<(), StoreError>;

    /// Load the record for `name`, or create and persist a fresh one.
    ///
    /// The fresh record is saved before this returns, so first-run
    /// initialization is durable before the caller proceeds.
    fn load_or_init(
        &self,
        name: &str,
        default_interval: u32,
        now: DateTime<FixedOffset>,
    ) -> Result<ReminderRecord, ReminderError> {
        let identity = normalize_name(name);
        if let Some(record) = self.load(&identity)? {
            return Ok(record);
        }
        let record = ReminderRecord::new(name, None, default_interval, now)?;
        self.save(&record)?;
        tracing::debug!(identity = %record.identity, "initialized countdown document");
        Ok(record)
    }
}

impl<S: ReminderStore + ?Sized> ReminderStore for Box<S> {
    fn load(&self, identity: &str) -> Result<Option<ReminderRecord>, StoreError> {
        (**self).load(identity)
    }

    fn load_all(&self) -> Result<Vec<ReminderRecord>, StoreError> {
        (**self).load_all()
    }

    fn save(&self, record: &ReminderRecord) -> Result<(), StoreError> {
        (**self).save(record)
    }

    fn delete(&self, identity: &str) -> Result<(), StoreError> {
        (**self).delete(identity)
    }
}

/// Decode a stored JSON document, restoring the identity it was keyed under.
///
/// Counters outside their valid ranges are rejected like undecodable JSON.
pub(crate) fn decode_document(identity: &str, document: &str) -> Result<ReminderRecord, StoreError> {
    let mut record: ReminderRecord =
        serde_json::from_str(document).map_err(|source| StoreError::Corrupt {
            identity: identity.to_string(),
            source,
        })?;
    validate_interval(i64::from(record.interval_days))
        .and_then(|_| validate_days(i64::from(record.days_remaining)))
        .map_err(|source| StoreError::OutOfRange {
            identity: identity.to_string(),
            source,
        })?;
    record.identity = identity.to_string();
    Ok(record)
}

pub(crate) fn encode_document(record: &ReminderRecord) -> Result<String, StoreError> {
    serde_json::to_string(record).map_err(|source| StoreError::Corrupt {
        identity: record.identity.clone(),
        source,
    })
}
