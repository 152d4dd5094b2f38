//! Mapping external command references to reminder identities.
//!
//! Resolution is exact at every step; nothing is matched by substring.
//!
//! 1. The reference normalized as a name. A hit here wins outright.
//! 2. Otherwise every other scheme is tried and all hits are collected:
//!    legacy entity keys (`number.recurring_reminders_<id>_countdown`,
//!    `..._interval`) and the configured alias table.
//!
//! Exactly one candidate resolves; zero or several is an
//! `AmbiguousTarget` error carrying the candidates.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{ReminderError, Result};
use crate::reminder::{identity_from_entity_id, normalize_name};
use crate::registry::ReminderRegistry;

#[derive(Debug, Clone, Default)]
pub struct TargetResolver {
    /// Normalized alias -> normalized identity.
    aliases: BTreeMap<String, String>,
}

impl TargetResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a resolver from an alias table. Keys and targets are normalized
    /// like reminder names.
    pub fn with_aliases<'a>(aliases: impl IntoIterator<Item = (&'a String, &'a String)>) -> Self {
        Self {
            aliases: aliases
                .into_iter()
                .map(|(alias, identity)| (normalize_name(alias), normalize_name(identity)))
                .collect(),
        }
    }

    /// Every identity `reference` could denote.
    pub fn candidates(&self, reference: &str, registry: &ReminderRegistry) -> Vec<String> {
        let normalized = normalize_name(reference);
        if registry.contains(&normalized) {
            return vec![normalized];
        }

        let mut found = BTreeSet::new();
        if let Some(identity) = identity_from_entity_id(reference.trim()) {
            let identity = normalize_name(identity);
            if registry.contains(&identity) {
                found.insert(identity);
            }
        }
        if let Some(identity) = self.aliases.get(&normalized) {
            if registry.contains(identity) {
                found.insert(identity.clone());
            }
        }
        found.into_iter().collect()
    }

    /// Resolve `reference` to exactly one identity.
    ///
    /// # Errors
    /// `AmbiguousTarget` when the reference matches zero or several reminders.
    pub fn resolve(&self, reference: &str, registry: &ReminderRegistry) -> Result<String> {
        let mut candidates = self.candidates(reference, registry);
        if candidates.len() == 1 {
            return Ok(candidates.remove(0));
        }
        Err(ReminderError::AmbiguousTarget {
            reference: reference.to_string(),
            candidates,
        })
    }
}
