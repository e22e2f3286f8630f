//! Shared helpers for integration tests

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use serde_json::Value;
use sm_status_core::store::{RecordStore, StoreResult};
use sm_status_core::{MemoryRecordStore, StoreError};

/// Memory store that counts calls and can be switched into failure mode.
#[derive(Default)]
pub struct RecordingStore {
    inner: MemoryRecordStore,
    pub gets: AtomicUsize,
    pub replaces: AtomicUsize,
    pub deletes: AtomicUsize,
    failing: AtomicBool,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn replaces(&self) -> usize {
        self.replaces.load(Ordering::SeqCst)
    }

    fn check(&self) -> StoreResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("store offline".to_string()))
        } else {
            Ok(())
        }
    }
}

impl RecordStore for RecordingStore {
    fn get(&self, category: &str, key: &str) -> StoreResult<Option<Value>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.get(category, key)
    }

    fn replace(&self, category: &str, key: &str, object: Value) -> StoreResult<()> {
        self.replaces.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.replace(category, key, object)
    }

    fn delete(&self, category: &str, key: &str) -> StoreResult<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.delete(category, key)
    }
}
