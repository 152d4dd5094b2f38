pub mod config;
pub mod reminder;
pub mod watch;

use std::sync::Arc;

use reminders_core::error::Result;
use reminders_core::{Clock, Config, RegistryOptions, ReminderRegistry, SqliteStore};
use serde::Serialize;

/// Open the on-disk registry. Loading applies any days missed while offline.
pub(crate) fn open_registry(config: &Config, clock: Arc<dyn Clock>) -> Result<ReminderRegistry> {
    let store = SqliteStore::open()?;
    ReminderRegistry::open(store, clock, RegistryOptions::from(&config.registry))
}

/// Print a value as pretty JSON on stdout.
pub(crate) fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::error!(error = %e, "failed to render output"),
    }
}
