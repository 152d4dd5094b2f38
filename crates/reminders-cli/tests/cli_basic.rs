//! Basic CLI E2E tests.
//!
//! Tests invoke the built `reminders` binary against a throwaway data
//! directory and verify the JSON it prints.

use std::path::Path;
use std::process::Command;

use serde_json::Value;
use tempfile::TempDir;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_reminders"))
        .args(args)
        .env("REMINDERS_DATA_DIR", data_dir)
        .env("REMINDERS_LOG", "off")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_json(data_dir: &Path, args: &[&str]) -> Value {
    let (stdout, stderr, code) = run_cli(data_dir, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    serde_json::from_str(&stdout).expect("stdout is not JSON")
}

fn run_error(data_dir: &Path, args: &[&str]) -> Value {
    let (_stdout, stderr, code) = run_cli(data_dir, args);
    assert_eq!(code, 1, "{args:?} should fail");
    let line = stderr.lines().last().expect("no error output");
    serde_json::from_str(line).expect("stderr is not a JSON error")
}

#[test]
fn test_add_and_show() {
    let dir = TempDir::new().unwrap();
    let created = run_json(dir.path(), &["add", "Water Plants", "--interval", "3"]);
    assert_eq!(created["identity"], "water_plants");
    assert_eq!(created["days_remaining"], 3);
    assert_eq!(created["is_due"], false);

    let shown = run_json(dir.path(), &["show", "water plants"]);
    assert_eq!(shown["interval_days"], 3);
    assert_eq!(shown["display_name"], "Water Plants");
}

#[test]
fn test_duplicate_add_fails() {
    let dir = TempDir::new().unwrap();
    run_json(dir.path(), &["add", "Water Plants", "--interval", "3"]);
    let err = run_error(dir.path(), &["add", "WATER PLANTS", "--interval", "5"]);
    assert_eq!(err["kind"], "duplicate_name");
}

#[test]
fn test_set_days_validation() {
    let dir = TempDir::new().unwrap();
    run_json(dir.path(), &["add", "Water Plants", "--interval", "3"]);

    let err = run_error(dir.path(), &["set-days", "Water Plants", "400"]);
    assert_eq!(err["kind"], "validation");

    let err = run_error(dir.path(), &["set-days", "Water Plants", "-1"]);
    assert_eq!(err["kind"], "validation");

    let shown = run_json(dir.path(), &["show", "Water Plants"]);
    assert_eq!(shown["days_remaining"], 3);
}

#[test]
fn test_commands_by_entity_key() {
    let dir = TempDir::new().unwrap();
    run_json(dir.path(), &["add", "Vacuum", "--interval", "7"]);

    let set = run_json(
        dir.path(),
        &["set-days", "number.recurring_reminders_vacuum_countdown", "0"],
    );
    assert_eq!(set["is_due"], true);

    let due = run_json(dir.path(), &["list", "--due"]);
    assert_eq!(due.as_array().unwrap().len(), 1);

    let interval = run_json(
        dir.path(),
        &["set-interval", "number.recurring_reminders_vacuum_interval", "14"],
    );
    assert_eq!(interval["interval_days"], 14);
    assert_eq!(interval["days_remaining"], 0);

    let reset = run_json(dir.path(), &["reset", "vacuum"]);
    assert_eq!(reset["days_remaining"], 14);
    assert_eq!(run_json(dir.path(), &["list", "--due"]), Value::Array(vec![]));
}

#[test]
fn test_unknown_target_fails() {
    let dir = TempDir::new().unwrap();
    run_json(dir.path(), &["add", "Water Plants", "--interval", "3"]);
    let err = run_error(dir.path(), &["reset", "plants"]);
    assert_eq!(err["kind"], "ambiguous_target");
}

#[test]
fn test_alias_from_config() {
    let dir = TempDir::new().unwrap();
    run_json(dir.path(), &["add", "Vacuum Hallway", "--interval", "7"]);

    let (stdout, stderr, code) = run_cli(
        dir.path(),
        &["config", "set", "aliases.hallway", "vacuum_hallway"],
    );
    assert_eq!(code, 0, "config set failed: {stderr}");
    assert_eq!(stdout.trim(), "ok");

    let set = run_json(dir.path(), &["set-days", "hallway", "2"]);
    assert_eq!(set["identity"], "vacuum_hallway");
    assert_eq!(set["days_remaining"], 2);
}

#[test]
fn test_remove_and_list() {
    let dir = TempDir::new().unwrap();
    run_json(dir.path(), &["add", "Water Plants", "--interval", "3"]);
    run_json(dir.path(), &["add", "Feed Cat", "--interval", "1"]);

    let removed = run_json(dir.path(), &["remove", "Water Plants"]);
    assert_eq!(removed["identity"], "water_plants");

    let list = run_json(dir.path(), &["list"]);
    let identities: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["identity"].as_str().unwrap())
        .collect();
    assert_eq!(identities, vec!["feed_cat"]);
}

#[test]
fn test_tick_reports_summary() {
    let dir = TempDir::new().unwrap();
    run_json(dir.path(), &["add", "Water Plants", "--interval", "3"]);

    // Created just now, so nothing decays on the same day.
    let summary = run_json(dir.path(), &["tick"]);
    assert_eq!(summary["decayed"], Value::Array(vec![]));
    assert_eq!(summary["failed"], Value::Array(vec![]));
}

#[test]
fn test_config_get_set() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "scheduler.cadence"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "midnight");

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "scheduler.interval_hours", "6"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", "scheduler.interval_hours"]);
    assert_eq!(stdout.trim(), "6");

    let err = run_error(dir.path(), &["config", "get", "no.such.key"]);
    assert_eq!(err["kind"], "config");

    let list = run_json(dir.path(), &["config", "list"]);
    assert_eq!(list["registry"]["catch_up_on_read"], true);
}
