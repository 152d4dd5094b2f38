//! Externally triggered commands: reset, set-days and set-interval.
//!
//! A [`Command`] names its reminder by an external reference (display name,
//! legacy entity key or alias). [`CommandHandler`] resolves the reference
//! and then runs the matching registry operation, so every command gets the
//! same validation, persistence and event publication as a direct call.

mod resolve;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ErrorReport, Result};
use crate::registry::ReminderRegistry;
use crate::reminder::ReminderSnapshot;
use crate::storage::Config;

pub use resolve::TargetResolver;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Restart the countdown at the interval.
    Reset { target: String },
    /// Override the countdown with `days` (0..=365).
    SetDays { target: String, days: i64 },
    /// Change the reset interval to `interval` (1..=365).
    SetInterval { target: String, interval: i64 },
}

impl Command {
    pub fn target(&self) -> &str {
        match self {
            Command::Reset { target }
            | Command::SetDays { target, .. }
            | Command::SetInterval { target, .. } => target,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Reset { .. } => "reset",
            Command::SetDays { .. } => "set_days",
            Command::SetInterval { .. } => "set_interval",
        }
    }
}

/// Result of a command as reported to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommandOutcome {
    /// The command was applied; carries the updated reminder.
    Applied(ReminderSnapshot),
    /// The command was rejected; nothing changed.
    Failed(ErrorReport),
}

impl CommandOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, CommandOutcome::Applied(_))
    }
}

/// Resolves command targets and dispatches to the registry.
#[derive(Debug, Clone, Default)]
pub struct CommandHandler {
    resolver: TargetResolver,
}

impl CommandHandler {
    pub fn new(resolver: TargetResolver) -> Self {
        Self { resolver }
    }

    /// Handler using the alias table from `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(TargetResolver::with_aliases(&config.aliases))
    }

    pub fn resolver(&self) -> &TargetResolver {
        &self.resolver
    }

    /// Resolve and run `command`.
    ///
    /// # Errors
    /// `AmbiguousTarget` when the target does not resolve to exactly one
    /// reminder, otherwise whatever the registry operation returns.
    pub fn execute(
        &self,
        registry: &mut ReminderRegistry,
        command: &Command,
    ) -> Result<ReminderSnapshot> {
        let identity = self.resolver.resolve(command.target(), registry)?;
        debug!(command = command.name(), target = command.target(), %identity, "command resolved");
        match command {
            Command::Reset { .. } => registry.reset(&identity),
            Command::SetDays { days, .. } => registry.set_days(&identity, *days),
            Command::SetInterval { interval, .. } => registry.set_interval(&identity, *interval),
        }
    }

    /// Like [`execute`](Self::execute), folding failures into a
    /// [`CommandOutcome::Failed`] report.
    pub fn dispatch(&self, registry: &mut ReminderRegistry, command: &Command) -> CommandOutcome {
        match self.execute(registry, command) {
            Ok(snapshot) => CommandOutcome::Applied(snapshot),
            Err(e) => {
                warn!(command = command.name(), target = command.target(), error = %e, "command rejected");
                CommandOutcome::Failed(ErrorReport::from(&e))
            }
        }
    }

    pub fn reset(&self, registry: &mut ReminderRegistry, target: &str) -> Result<ReminderSnapshot> {
        self.execute(
            registry,
            &Command::Reset {
                target: target.to_string(),
            },
        )
    }

    pub fn set_days(
        &self,
        registry: &mut ReminderRegistry,
        target: &str,
        days: i64,
    ) -> Result<ReminderSnapshot> {
        self.execute(
            registry,
            &Command::SetDays {
                target: target.to_string(),
                days,
            },
        )
    }

    pub fn set_interval(
        &self,
        registry: &mut ReminderRegistry,
        target: &str,
        interval: i64,
    ) -> Result<ReminderSnapshot> {
        self.execute(
            registry,
            &Command::SetInterval {
                target: target.to_string(),
                interval,
            },
        )
    }
}
