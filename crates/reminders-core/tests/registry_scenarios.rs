//! End-to-end reminder scenarios through the public API.
//!
//! Each test drives a registry with a manual clock and checks the visible
//! snapshot, the persisted document and the published events together.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, FixedOffset, TimeZone};
use reminders_core::{
    Clock, Command, CommandHandler, CommandOutcome, ErrorKind, Event, ManualClock, MemoryStore,
    RegistryOptions, ReminderRegistry, ReminderStore,
};

// ============================================================================
// Test Helpers
// ============================================================================

fn morning() -> DateTime<FixedOffset> {
    FixedOffset::east_opt(2 * 3600)
        .unwrap()
        .with_ymd_and_hms(2026, 10, 18, 8, 30, 0)
        .unwrap()
}

struct Harness {
    registry: ReminderRegistry,
    store: MemoryStore,
    clock: ManualClock,
    events: Arc<Mutex<Vec<Event>>>,
}

fn harness() -> Harness {
    let store = MemoryStore::new();
    let clock = ManualClock::new(morning());
    let mut registry =
        ReminderRegistry::open(store.clone(), Arc::new(clock.clone()), RegistryOptions::default())
            .unwrap();
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    registry.subscribe(move |event: &Event| sink.lock().unwrap().push(event.clone()));
    Harness {
        registry,
        store,
        clock,
        events,
    }
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_new_reminder_starts_at_interval() {
    let mut h = harness();
    let snapshot = h.registry.create("Water Plants", 3).unwrap();

    assert_eq!(snapshot.days_remaining, 3);
    assert!(!snapshot.is_due);
    assert_eq!(snapshot.display_name, "Water Plants");
    assert_eq!(
        snapshot.countdown_entity_id,
        "number.recurring_reminders_water_plants_countdown"
    );

    let stored = h.store.load("water_plants").unwrap().unwrap();
    assert_eq!(stored.days_remaining, 3);
    assert_eq!(stored.interval_days, 3);
}

#[test]
fn test_two_days_later_tick_decrements_by_two() {
    let mut h = harness();
    h.registry.create("Water Plants", 3).unwrap();
    h.clock.advance(Duration::days(2));

    let report = h.registry.tick_all(h.clock.now());
    assert!(report.is_clean());
    assert_eq!(h.registry.get("water_plants").unwrap().days_remaining, 1);
}

#[test]
fn test_due_reminder_stays_at_zero() {
    let mut h = harness();
    h.registry.create("Feed Cat", 1).unwrap();
    h.registry.set_days("feed_cat", 0).unwrap();
    let before = h.store.document("feed_cat");
    let events_before = h.events.lock().unwrap().len();

    h.clock.advance(Duration::days(1));
    h.registry.tick_all(h.clock.now());

    let snapshot = h.registry.snapshot("feed_cat").unwrap();
    assert_eq!(snapshot.days_remaining, 0);
    assert!(snapshot.is_due);
    // Nothing to persist or announce when the value did not move.
    assert_eq!(h.store.document("feed_cat"), before);
    assert_eq!(h.events.lock().unwrap().len(), events_before);
}

#[test]
fn test_set_days_above_max_is_rejected() {
    let mut h = harness();
    h.registry.create("Water Plants", 3).unwrap();

    let outcome = CommandHandler::default().dispatch(
        &mut h.registry,
        &Command::SetDays {
            target: "Water Plants".into(),
            days: 400,
        },
    );
    assert!(matches!(
        outcome,
        CommandOutcome::Failed(ref report) if report.kind == ErrorKind::Validation
    ));
    assert_eq!(h.registry.get("water_plants").unwrap().days_remaining, 3);
}

#[test]
fn test_duplicate_name_in_any_case_is_rejected() {
    let mut h = harness();
    h.registry.create("Water Plants", 3).unwrap();

    for name in ["water plants", "WATER PLANTS", "  Water Plants  "] {
        let err = h.registry.create(name, 7).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateName);
    }
    assert_eq!(h.registry.len(), 1);
    assert_eq!(h.store.len(), 1);
}

// ============================================================================
// Properties over commands
// ============================================================================

#[test]
fn test_long_absence_floors_at_zero() {
    let mut h = harness();
    h.registry.create("Vacuum", 7).unwrap();
    h.registry.set_days("vacuum", 3).unwrap();
    h.clock.advance(Duration::days(5));

    h.registry.tick_all(h.clock.now());
    assert_eq!(h.registry.get("vacuum").unwrap().days_remaining, 0);

    let events = h.events.lock().unwrap();
    assert!(matches!(
        events.last(),
        Some(Event::CountdownDecayed {
            from: 3,
            to: 0,
            elapsed_days: 5,
            ..
        })
    ));
}

#[test]
fn test_repeated_ticks_same_day_are_noops() {
    let mut h = harness();
    h.registry.create("Vacuum", 7).unwrap();
    h.clock.advance(Duration::days(1));
    h.registry.tick_all(h.clock.now());
    let after_first = h.store.document("vacuum");

    for _ in 0..3 {
        h.clock.advance(Duration::hours(2));
        let report = h.registry.tick_all(h.clock.now());
        assert_eq!(report.decayed().count(), 0);
    }
    assert_eq!(h.store.document("vacuum"), after_first);
    assert_eq!(h.registry.get("vacuum").unwrap().days_remaining, 6);
}

#[test]
fn test_reset_restores_interval_from_any_value() {
    let mut h = harness();
    h.registry.create("Vacuum", 7).unwrap();
    let handler = CommandHandler::default();

    for days in [0, 3, 40] {
        handler.set_days(&mut h.registry, "Vacuum", days).unwrap();
        let snapshot = handler.reset(&mut h.registry, "Vacuum").unwrap();
        assert_eq!(snapshot.days_remaining, 7);
    }
}

#[test]
fn test_interval_change_keeps_countdown() {
    let mut h = harness();
    h.registry.create("Vacuum", 7).unwrap();
    h.clock.advance(Duration::days(2));
    h.registry.tick_all(h.clock.now());

    let snapshot = CommandHandler::default()
        .set_interval(
            &mut h.registry,
            "number.recurring_reminders_vacuum_interval",
            14,
        )
        .unwrap();
    assert_eq!(snapshot.interval_days, 14);
    assert_eq!(snapshot.days_remaining, 5);

    // The next reset uses the new interval.
    assert_eq!(h.registry.reset("vacuum").unwrap().days_remaining, 14);
}

#[test]
fn test_failed_write_during_tick_is_isolated() {
    let mut h = harness();
    h.registry.create("Feed Cat", 3).unwrap();
    h.registry.create("Vacuum", 7).unwrap();
    h.clock.advance(Duration::days(1));
    h.store.fail_writes(true);

    let report = h.registry.tick_all(h.clock.now());
    assert_eq!(report.failures().count(), 2);

    // Memory never got ahead of the store, so the retry applies the day.
    h.store.fail_writes(false);
    let report = h.registry.tick_all(h.clock.now());
    assert_eq!(report.decayed().count(), 2);
    assert_eq!(h.registry.get("feed_cat").unwrap().days_remaining, 2);
}
