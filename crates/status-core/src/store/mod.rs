//! Status record storage
//!
//! [`RecordStore`] is the boundary to the host's object store: untyped
//! objects filed under a category and a key. [`StatusRecords`] is the typed
//! view the status module works through.

use std::sync::Arc;

use jid::BareJid;
use serde_json::Value;

use crate::error::{Result, StatusError, StoreError};
use crate::record::StatusRecord;

pub mod memory;

pub use memory::MemoryRecordStore;

/// Category under which status records are filed.
pub const STATUS_CATEGORY: &str = "status";

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Key/object store provided by the host.
///
/// `get` returning `Ok(None)` is the ordinary "no such object" outcome.
pub trait RecordStore: Send + Sync {
    fn get(&self, category: &str, key: &str) -> StoreResult<Option<Value>>;

    /// Overwrite whatever is stored under `key`.
    fn replace(&self, category: &str, key: &str, object: Value) -> StoreResult<()>;

    fn delete(&self, category: &str, key: &str) -> StoreResult<()>;
}

impl<T: RecordStore + ?Sized> RecordStore for Arc<T> {
    fn get(&self, category: &str, key: &str) -> StoreResult<Option<Value>> {
        (**self).get(category, key)
    }

    fn replace(&self, category: &str, key: &str, object: Value) -> StoreResult<()> {
        (**self).replace(category, key, object)
    }

    fn delete(&self, category: &str, key: &str) -> StoreResult<()> {
        (**self).delete(category, key)
    }
}

/// Typed access to the `status` category.
#[derive(Debug, Clone)]
pub struct StatusRecords<S> {
    store: S,
}

impl<S: RecordStore> StatusRecords<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn inner(&self) -> &S {
        &self.store
    }

    /// Fetch the record for `user`, `None` if nothing was ever written.
    pub fn get(&self, user: &BareJid) -> Result<Option<StatusRecord>> {
        let key = user.to_string();
        match self.store.get(STATUS_CATEGORY, &key)? {
            Some(object) => serde_json::from_value(object)
                .map(Some)
                .map_err(|e| StatusError::Record(format!("status record for {}: {}", key, e))),
            None => Ok(None),
        }
    }

    /// Fetch the record for `user`, substituting the zero record when absent.
    pub fn get_or_default(&self, user: &BareJid) -> Result<StatusRecord> {
        Ok(self.get(user)?.unwrap_or_default())
    }

    pub fn replace(&self, user: &BareJid, record: &StatusRecord) -> Result<()> {
        let object = serde_json::to_value(record).map_err(|e| StatusError::Record(e.to_string()))?;
        self.store.replace(STATUS_CATEGORY, &user.to_string(), object)?;
        Ok(())
    }

    pub fn delete(&self, user: &BareJid) -> Result<()> {
        self.store.delete(STATUS_CATEGORY, &user.to_string())?;
        Ok(())
    }
}
