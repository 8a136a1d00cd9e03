//! In-process cart storage.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::StorageError;
use crate::line_item::LineItem;

use super::{CartStorage, StorageKey};

/// Cart storage backed by a shared in-memory map.
///
/// Clones share the same map, so a test can keep one handle while the store
/// owns another. Writes can be made to fail on demand to exercise the store's
/// handling of persistence failures.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    records: HashMap<StorageKey, Vec<LineItem>>,
    fail_writes: bool,
    writes: usize,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `save` and `remove` calls fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    /// Number of successful saves and removals so far.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.lock().writes
    }

    /// The record currently stored under `key`.
    #[must_use]
    pub fn get(&self, key: &StorageKey) -> Option<Vec<LineItem>> {
        self.lock().records.get(key).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CartStorage for MemoryStorage {
    fn load(&self, key: &StorageKey) -> Result<Option<Vec<LineItem>>, StorageError> {
        Ok(self.get(key))
    }

    fn save(&self, key: &StorageKey, items: &[LineItem]) -> Result<(), StorageError> {
        let mut inner = self.lock();
        if inner.fail_writes {
            return Err(StorageError::Unavailable(format!(
                "memory storage rejected write for {key}"
            )));
        }
        inner.records.insert(key.clone(), items.to_vec());
        inner.writes += 1;
        Ok(())
    }

    fn remove(&self, key: &StorageKey) -> Result<(), StorageError> {
        let mut inner = self.lock();
        if inner.fail_writes {
            return Err(StorageError::Unavailable(format!(
                "memory storage rejected removal of {key}"
            )));
        }
        inner.records.remove(key);
        inner.writes += 1;
        Ok(())
    }
}
