//! In-memory key-value slots.

use crate::QuoteStore;
use crate::error::{StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// Map-backed store. Nothing survives the process.
///
/// Writes can be made to fail on demand to exercise the degraded,
/// in-memory-only path of callers.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with `value` already stored under `key`.
    pub fn with_value(key: &str, value: impl Into<String>) -> Self {
        let store = Self::new();
        store
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.into());
        store
    }

    /// Makes every subsequent write fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl QuoteStore for MemoryStore {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        let slots = self
            .slots
            .lock()
            .map_err(|_| StorageError::Unavailable("slot lock poisoned".to_string()))?;
        Ok(slots.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> StorageResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("quota exceeded".to_string()));
        }
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| StorageError::Unavailable("slot lock poisoned".to_string()))?;
        slots.insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
