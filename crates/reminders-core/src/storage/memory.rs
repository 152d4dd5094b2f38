//! In-process reminder storage.
//!
//! Documents are kept as JSON strings so the same encode/decode path as the
//! SQLite store is exercised. Clones share the underlying map, which lets a
//! test hand one clone to the registry and inspect the other.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::StoreError;
use crate::reminder::ReminderRecord;

use super::{decode_document, encode_document, ReminderStore};

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: Arc<Mutex<BTreeMap<String, String>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `save` and `delete` fail until switched off.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Raw stored document, for assertions.
    pub fn document(&self, identity: &str) -> Option<String> {
        self.lock().get(identity).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.documents.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_writable(&self, identity: &str) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::WriteFailed {
                identity: identity.to_string(),
                message: "writes disabled".to_string(),
            });
        }
        Ok(())
    }
}

impl ReminderStore for MemoryStore {
    fn load(&self, identity: &str) -> Result<Option<ReminderRecord>, StoreError> {
        self.lock()
            .get(identity)
            .map(|document| decode_document(identity, document))
            .transpose()
    }

    fn load_all(&self) -> Result<Vec<ReminderRecord>, StoreError> {
        self.lock()
            .iter()
            .map(|(identity, document)| decode_document(identity, document))
            .collect()
    }

    fn save(&self, record: &ReminderRecord) -> Result<(), StoreError> {
        self.check_writable(&record.identity)?;
        let document = encode_document(record)?;
        self.lock().insert(record.identity.clone(), document);
        Ok(())
    }

    fn delete(&self, identity: &str) -> Result<(), StoreError> {
        self.check_writable(identity)?;
        self.lock().remove(identity);
        Ok(())
    }
}
