//! Restart behavior against a real SQLite file.

use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset, TimeZone};
use reminders_core::{Clock, ManualClock, RegistryOptions, ReminderRegistry, ReminderStore, SqliteStore};
use tempfile::TempDir;

fn evening() -> DateTime<FixedOffset> {
    FixedOffset::east_opt(-5 * 3600)
        .unwrap()
        .with_ymd_and_hms(2026, 10, 18, 21, 0, 0)
        .unwrap()
}

fn open(dir: &TempDir, clock: &ManualClock, options: RegistryOptions) -> ReminderRegistry {
    let store = SqliteStore::open_at(&dir.path().join("reminders.db")).unwrap();
    ReminderRegistry::open(store, Arc::new(clock.clone()), options).unwrap()
}

#[test]
fn test_reminders_survive_restart() {
    let dir = TempDir::new().unwrap();
    let clock = ManualClock::new(evening());
    {
        let mut registry = open(&dir, &clock, RegistryOptions::default());
        registry.create("Water Plants", 3).unwrap();
        registry.create("Change Filter", 90).unwrap();
        registry.set_days("change_filter", 12).unwrap();
    }

    let mut registry = open(&dir, &clock, RegistryOptions::default());
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.get("water_plants").unwrap().days_remaining, 3);

    let filter = registry.get("change_filter").unwrap();
    assert_eq!(filter.days_remaining, 12);
    assert_eq!(filter.interval_days, 90);
    assert_eq!(filter.name, "Change Filter");
}

#[test]
fn test_startup_catches_up_offline_days() {
    let dir = TempDir::new().unwrap();
    let clock = ManualClock::new(evening());
    {
        let mut registry = open(&dir, &clock, RegistryOptions::default());
        registry.create("Water Plants", 7).unwrap();
    }

    // Four calendar days pass while nothing is running.
    clock.advance(Duration::days(4));
    {
        let no_read_catch_up = RegistryOptions {
            catch_up_on_read: false,
        };
        let mut registry = open(&dir, &clock, no_read_catch_up);
        assert_eq!(registry.get("water_plants").unwrap().days_remaining, 3);
    }

    // The startup catch-up was persisted, not just applied in memory.
    let store = SqliteStore::open_at(&dir.path().join("reminders.db")).unwrap();
    let record = store.load("water_plants").unwrap().unwrap();
    assert_eq!(record.days_remaining, 3);
    assert_eq!(record.last_updated, clock.now());
}

#[test]
fn test_removed_reminder_stays_removed() {
    let dir = TempDir::new().unwrap();
    let clock = ManualClock::new(evening());
    {
        let mut registry = open(&dir, &clock, RegistryOptions::default());
        registry.create("Water Plants", 3).unwrap();
        registry.create("Feed Cat", 1).unwrap();
        registry.remove("water_plants").unwrap();
    }

    let registry = open(&dir, &clock, RegistryOptions::default());
    let identities: Vec<&str> = registry.identities().collect();
    assert_eq!(identities, vec!["feed_cat"]);
}

#[test]
fn test_load_or_init_persists_fresh_record() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("reminders.db");
    {
        let store = SqliteStore::open_at(&path).unwrap();
        let record = store.load_or_init("Descale Kettle", 30, evening()).unwrap();
        assert_eq!(record.days_remaining, 30);
    }

    let store = SqliteStore::open_at(&path).unwrap();
    let record = store.load_or_init("Descale Kettle", 5, evening()).unwrap();
    assert_eq!(record.interval_days, 30);
}
