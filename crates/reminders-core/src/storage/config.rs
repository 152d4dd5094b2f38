//! TOML-based application configuration.
//!
//! Stores:
//! - Scheduler cadence (midnight-anchored or fixed interval)
//! - Read-time catch-up toggle
//! - Log level
//! - Command target aliases
//!
//! Configuration is stored at `<data_dir>/config.toml`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::ConfigError;
use crate::scheduler::Cadence;

/// Longest accepted `scheduler.interval_hours`, one year.
pub const MAX_INTERVAL_HOURS: u64 = 24 * 365;

/// How the tick scheduler anchors its firing times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CadenceKind {
    /// Fire at every local midnight.
    Midnight,
    /// Fire every `interval_hours` from process start.
    Interval,
}

/// Scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_cadence")]
    pub cadence: CadenceKind,
    #[serde(default = "default_interval_hours")]
    pub interval_hours: u64,
}

/// Registry behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Reconcile a reminder on every read, not only on scheduled ticks.
    ///
    /// Turning this off means reads can return a countdown that is stale
    /// until the next scheduled tick.
    #[serde(default = "default_true")]
    pub catch_up_on_read: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default filter directive when `REMINDERS_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data_dir>/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub log: LogConfig,
    /// Alternate command references, alias -> identity.
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

// Default functions
fn default_cadence() -> CadenceKind {
    CadenceKind::Midnight
}
fn default_interval_hours() -> u64 {
    24
}
fn default_true() -> bool {
    true
}
fn default_log_level() -> String {
    "info".into()
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            cadence: default_cadence(),
            interval_hours: default_interval_hours(),
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            catch_up_on_read: true,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scheduler: SchedulerConfig::default(),
            registry: RegistryConfig::default(),
            log: LogConfig::default(),
            aliases: BTreeMap::new(),
        }
    }
}

impl SchedulerConfig {
    /// Resolve the configured cadence. An interval of zero or above
    /// [`MAX_INTERVAL_HOURS`] falls back to 24 hours.
    pub fn cadence(&self) -> Cadence {
        match self.cadence {
            CadenceKind::Midnight => Cadence::Midnight,
            CadenceKind::Interval => {
                let hours = match self.interval_hours {
                    0 => default_interval_hours(),
                    h if h > MAX_INTERVAL_HOURS => default_interval_hours(),
                    h => h,
                };
                Cadence::Every(Duration::from_secs(hours * 3600))
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_hours > MAX_INTERVAL_HOURS {
            return Err(ConfigError::InvalidValue {
                key: "scheduler.interval_hours".into(),
                message: format!(
                    "must be at most {MAX_INTERVAL_HOURS}, got {}",
                    self.interval_hours
                ),
            });
        }
        Ok(())
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(unknown());
        }

        let mut current = root;
        let mut depth = 0;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                // Alias entries are free-form keys under `aliases`.
                let in_alias_table = depth == 1 && key.starts_with("aliases.");
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let new_value = match obj.get(part) {
                    None if in_alias_table => serde_json::Value::String(value.into()),
                    None => return Err(unknown()),
                    Some(serde_json::Value::Bool(_)) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
                    ),
                    Some(serde_json::Value::Number(_)) => value
                        .parse::<u64>()
                        .map(|n| serde_json::Value::Number(n.into()))
                        .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?,
                    Some(serde_json::Value::Object(_)) | Some(serde_json::Value::Array(_)) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    Some(_) => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
            depth += 1;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("config.toml"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from the data directory, writing defaults on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, writing defaults there if it is missing.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key in memory. Returns error if key is unknown
    /// or the value does not fit the existing field.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.scheduler.validate()?;
        *self = updated;
        Ok(())
    }
}
