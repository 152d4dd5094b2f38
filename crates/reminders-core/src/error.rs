//! Core error types for reminders-core.
//!
//! Errors are layered the same way the storage and registry layers are:
//! [`StoreError`] for persistence, [`ValidationError`] for rejected input,
//! [`ConfigError`] for the TOML configuration, and [`ReminderError`] as the
//! type every public registry and command operation returns.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable error classification reported at the command boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    DuplicateName,
    NotFound,
    Validation,
    AmbiguousTarget,
    Persistence,
    Config,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::DuplicateName => "duplicate_name",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Validation => "validation",
            ErrorKind::AmbiguousTarget => "ambiguous_target",
            ErrorKind::Persistence => "persistence",
            ErrorKind::Config => "config",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for registry and command operations.
#[derive(Error, Debug)]
pub enum ReminderError {
    /// A reminder with the same normalized name already exists.
    #[error("A reminder named '{name}' already exists (identity '{identity}')")]
    DuplicateName { name: String, identity: String },

    /// No reminder with this identity.
    #[error("Reminder '{0}' not found")]
    NotFound(String),

    /// Rejected numeric or textual input
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A command reference matched zero or several reminders.
    #[error("{}", ambiguous_message(.reference, .candidates))]
    AmbiguousTarget {
        reference: String,
        candidates: Vec<String>,
    },

    /// Underlying store failure
    #[error("Persistence error: {0}")]
    Persistence(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

fn ambiguous_message(reference: &str, candidates: &[String]) -> String {
    if candidates.is_empty() {
        format!("Target '{reference}' does not match any reminder")
    } else {
        format!(
            "Target '{reference}' is ambiguous, it matches: {}",
            candidates.join(", ")
        )
    }
}

impl ReminderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReminderError::DuplicateName { .. } => ErrorKind::DuplicateName,
            ReminderError::NotFound(_) => ErrorKind::NotFound,
            ReminderError::Validation(_) => ErrorKind::Validation,
            ReminderError::AmbiguousTarget { .. } => ErrorKind::AmbiguousTarget,
            ReminderError::Persistence(_) => ErrorKind::Persistence,
            ReminderError::Config(_) => ErrorKind::Config,
        }
    }
}

/// Structured `kind` + `message` pair reported for a failed operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&ReminderError> for ErrorReport {
    fn from(err: &ReminderError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<ReminderError> for ErrorReport {
    fn from(err: ReminderError) -> Self {
        Self::from(&err)
    }
}

/// Store-specific errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// A persisted document could not be decoded or encoded.
    #[error("Corrupt document for reminder '{identity}': {source}")]
    Corrupt {
        identity: String,
        #[source]
        source: serde_json::Error,
    },

    /// A persisted document decoded but holds values outside their ranges.
    #[error("Stored document for reminder '{identity}' is out of range: {source}")]
    OutOfRange {
        identity: String,
        #[source]
        source: ValidationError,
    },

    /// The data directory could not be resolved or created.
    #[error("Failed to access data directory: {0}")]
    DataDir(String),

    /// Injected or backend-specific write failure.
    #[error("Write failed for reminder '{identity}': {message}")]
    WriteFailed { identity: String, message: String },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Numeric argument outside its allowed range.
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: u32,
        max: u32,
    },

    /// Name is empty after normalization.
    #[error("Reminder name must contain at least one letter or digit")]
    EmptyName,
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(inner, _msg) => {
                if inner.code == rusqlite::ErrorCode::DatabaseLocked
                    || inner.code == rusqlite::ErrorCode::DatabaseBusy
                {
                    StoreError::Locked
                } else {
                    StoreError::QueryFailed(err.to_string())
                }
            }
            _ => StoreError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for ReminderError
pub type Result<T, E = ReminderError> = std::result::Result<T, E>;
