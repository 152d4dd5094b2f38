//! SQLite-backed reminder storage.
//!
//! One row per reminder in the `reminders` table. The row holds the JSON
//! countdown document, and `INSERT OR REPLACE` swaps it in a single
//! statement so readers never see a half-written record.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection};

use crate::error::StoreError;
use crate::reminder::ReminderRecord;

use super::{data_dir, decode_document, encode_document, ReminderStore};

/// SQLite database for reminder documents.
pub struct SqliteStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open the database at `<data_dir>/reminders.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StoreError> {
        let path = data_dir()?.join("reminders.db");
        Self::open_at(&path)
    }

    /// Open (or create) a database file at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|source| StoreError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self {
            conn,
            path: Some(path.to_path_buf()),
        };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|source| StoreError::OpenFailed {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        let store = Self { conn, path: None };
        store.migrate()?;
        Ok(store)
    }

    /// Database file path, `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn migrate(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS reminders (
                identity    TEXT PRIMARY KEY,
                document    TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            );",
        )?;
        Ok(())
    }
}

impl ReminderStore for SqliteStore {
    fn load(&self, identity: &str) -> Result<Option<ReminderRecord>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT document FROM reminders WHERE identity = ?1")?;
        let result = stmt.query_row(params![identity], |row| row.get::<_, String>(0));
        match result {
            Ok(document) => decode_document(identity, &document).map(Some),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn load_all(&self) -> Result<Vec<ReminderRecord>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT identity, document FROM reminders ORDER BY identity")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (identity, document) = row?;
            records.push(decode_document(&identity, &document)?);
        }
        Ok(records)
    }

    fn save(&self, record: &ReminderRecord) -> Result<(), StoreError> {
        let document = encode_document(record)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO reminders (identity, document, updated_at)
             VALUES (?1, ?2, ?3)",
            params![record.identity, document, record.last_updated.to_rfc3339()],
        )?;
        Ok(())
    }

    fn delete(&self, identity: &str) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM reminders WHERE identity = ?1", params![identity])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, FixedOffset, TimeZone};

    fn now() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2026, 10, 18, 9, 30, 0)
            .unwrap()
    }

    #[test]
    fn save_and_load() {
        let store = SqliteStore::open_memory().unwrap();
        let record = ReminderRecord::new("Water Plants", None, 3, now()).unwrap();
        store.save(&record).unwrap();

        let loaded = store.load("water_plants").unwrap().unwrap();
        assert_eq!(loaded, record);
        assert!(store.load("feed_cat").unwrap().is_none());
    }

    #[test]
    fn save_overwrites_existing_row() {
        let store = SqliteStore::open_memory().unwrap();
        let mut record = ReminderRecord::new("Water Plants", None, 3, now()).unwrap();
        store.save(&record).unwrap();
        record.days_remaining = 1;
        store.save(&record).unwrap();

        let all = store.load_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].days_remaining, 1);
    }

    #[test]
    fn delete_missing_is_noop() {
        let store = SqliteStore::open_memory().unwrap();
        store.delete("ghost").unwrap();
    }

    #[test]
    fn load_or_init_persists_fresh_record() {
        let store = SqliteStore::open_memory().unwrap();
        let record = store.load_or_init("Feed Cat", 2, now()).unwrap();
        assert_eq!(record.days_remaining, 2);
        assert_eq!(store.load("feed_cat").unwrap(), Some(record.clone()));

        // Second call loads rather than re-initializing.
        let again = store.load_or_init("Feed Cat", 9, now()).unwrap();
        assert_eq!(again.interval_days, 2);
    }

    #[test]
    fn corrupt_document_names_identity() {
        let store = SqliteStore::open_memory().unwrap();
        store
            .conn
            .execute(
                "INSERT INTO reminders (identity, document, updated_at) VALUES ('broken', '{', '')",
                [],
            )
            .unwrap();
        match store.load("broken") {
            Err(StoreError::Corrupt { identity, .. }) => assert_eq!(identity, "broken"),
            other => panic!("expected corrupt document error, got {other:?}"),
        }
    }

    #[test]
    fn out_of_range_document_is_rejected() {
        let store = SqliteStore::open_memory().unwrap();
        let bad = [
            ("zero_interval", r#"{"name":"Zero Interval","interval_days":0,"days_remaining":3,"last_updated":"2026-10-18T09:30:00+01:00"}"#),
            ("huge_countdown", r#"{"name":"Huge Countdown","interval_days":7,"days_remaining":9999,"last_updated":"2026-10-18T09:30:00+01:00"}"#),
        ];
        for (identity, document) in bad {
            store
                .conn
                .execute(
                    "INSERT INTO reminders (identity, document, updated_at) VALUES (?1, ?2, '')",
                    params![identity, document],
                )
                .unwrap();
            match store.load(identity) {
                Err(StoreError::OutOfRange { identity: id, .. }) => assert_eq!(id, identity),
                other => panic!("expected out-of-range error, got {other:?}"),
            }
        }
        assert!(store.load_all().is_err());
    }

    #[test]
    fn updated_at_follows_record_timestamp() {
        let store = SqliteStore::open_memory().unwrap();
        let record = ReminderRecord::new("Water Plants", None, 3, now()).unwrap();
        store.save(&record).unwrap();

        let updated_at: String = store
            .conn
            .query_row(
                "SELECT updated_at FROM reminders WHERE identity = 'water_plants'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(updated_at, now().to_rfc3339());
    }
}
