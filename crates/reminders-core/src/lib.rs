//! # Recurring Reminders Core Library
//!
//! Core logic for named recurring reminders: each reminder counts down whole
//! calendar days from a configured interval and is "due" once the countdown
//! reaches zero. The `reminders` CLI is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Countdown**: pure calendar-day reconciliation of a record against "now"
//! - **Registry**: the single in-memory source of truth, persisting every
//!   change before it becomes visible and publishing an [`Event`] for it
//! - **Scheduler**: a caller-owned timer that drives the registry's tick
//! - **Commands**: external references resolved to identities, then
//!   reset / set-days / set-interval
//! - **Storage**: SQLite-backed document store and TOML configuration
//!
//! ## Key Components
//!
//! - [`ReminderRegistry`]: create, mutate, query and tick reminders
//! - [`TickScheduler`]: periodic reconciliation with overlap protection
//! - [`CommandHandler`]: command dispatch with target resolution
//! - [`SqliteStore`]: durable per-reminder documents
//! - [`Config`]: application configuration

pub mod clock;
pub mod commands;
pub mod error;
pub mod events;
pub mod registry;
pub mod reminder;
pub mod scheduler;
pub mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use commands::{Command, CommandHandler, CommandOutcome, TargetResolver};
pub use error::{ConfigError, ErrorKind, ErrorReport, ReminderError, StoreError, ValidationError};
pub use events::{Event, ReminderObserver};
pub use registry::{RegistryOptions, ReminderRegistry, SharedRegistry, TickReport, TickSummary};
pub use reminder::{DueStatus, ReminderRecord, ReminderSnapshot};
pub use scheduler::{Cadence, Scheduler, TickScheduler, TokioScheduler};
pub use storage::{Config, MemoryStore, ReminderStore, SqliteStore};
