use std::sync::Arc;

use reminders_core::error::Result;
use reminders_core::{CommandHandler, Config, ReminderRegistry, SystemClock};

use super::{open_registry, print_json};

fn registry(config: &Config) -> Result<ReminderRegistry> {
    open_registry(config, Arc::new(SystemClock))
}

pub fn add(config: &Config, name: &str, interval: i64, display_name: Option<String>) -> Result<()> {
    let mut registry = registry(config)?;
    let snapshot = registry.create_with_display_name(name, display_name, interval)?;
    print_json(&snapshot);
    Ok(())
}

pub fn list(config: &Config, due_only: bool) -> Result<()> {
    let mut registry = registry(config)?;
    let snapshots = if due_only {
        registry.due()?
    } else {
        registry.list()?
    };
    print_json(&snapshots);
    Ok(())
}

pub fn show(config: &Config, target: &str) -> Result<()> {
    let mut registry = registry(config)?;
    let identity = CommandHandler::from_config(config)
        .resolver()
        .resolve(target, &registry)?;
    print_json(&registry.snapshot(&identity)?);
    Ok(())
}

pub fn remove(config: &Config, target: &str) -> Result<()> {
    let mut registry = registry(config)?;
    let identity = CommandHandler::from_config(config)
        .resolver()
        .resolve(target, &registry)?;
    print_json(&registry.remove(&identity)?);
    Ok(())
}

pub fn reset(config: &Config, target: &str) -> Result<()> {
    let mut registry = registry(config)?;
    let snapshot = CommandHandler::from_config(config).reset(&mut registry, target)?;
    print_json(&snapshot);
    Ok(())
}

pub fn set_days(config: &Config, target: &str, days: i64) -> Result<()> {
    let mut registry = registry(config)?;
    let snapshot = CommandHandler::from_config(config).set_days(&mut registry, target, days)?;
    print_json(&snapshot);
    Ok(())
}

pub fn set_interval(config: &Config, target: &str, interval: i64) -> Result<()> {
    let mut registry = registry(config)?;
    let snapshot =
        CommandHandler::from_config(config).set_interval(&mut registry, target, interval)?;
    print_json(&snapshot);
    Ok(())
}

/// One reconciliation pass. Per-reminder failures are part of the printed
/// report and do not fail the command.
pub fn tick(config: &Config) -> Result<()> {
    let mut registry = registry(config)?;
    let now = registry.now();
    print_json(&registry.tick_all(now).summary());
    Ok(())
}
