//! In-memory record store

use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;

use super::{RecordStore, StoreResult};

/// `RecordStore` backed by a concurrent map. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
    /// (category, key) -> object
    objects: Arc<DashMap<(String, String), Value>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self {
            objects: Arc::new(DashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Keys stored under a category
    pub fn keys(&self, category: &str) -> Vec<String> {
        self.objects
            .iter()
            .filter(|entry| entry.key().0 == category)
            .map(|entry| entry.key().1.clone())
            .collect()
    }
}

impl RecordStore for MemoryRecordStore {
    fn get(&self, category: &str, key: &str) -> StoreResult<Option<Value>> {
        Ok(self
            .objects
            .get(&(category.to_string(), key.to_string()))
            .map(|entry| entry.value().clone()))
    }

    fn replace(&self, category: &str, key: &str, object: Value) -> StoreResult<()> {
        self.objects.insert((category.to_string(), key.to_string()), object);
        Ok(())
    }

    fn delete(&self, category: &str, key: &str) -> StoreResult<()> {
        self.objects.remove(&(category.to_string(), key.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_categories_are_separate() {
        let store = MemoryRecordStore::new();
        store.replace("status", "a@b", json!({"n": 1})).unwrap();
        store.replace("roster", "a@b", json!({"n": 2})).unwrap();

        assert_eq!(store.get("status", "a@b").unwrap(), Some(json!({"n": 1})));
        assert_eq!(store.keys("roster"), vec!["a@b".to_string()]);

        store.delete("status", "a@b").unwrap();
        assert_eq!(store.get("status", "a@b").unwrap(), None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_delete_missing_is_ok() {
        let store = MemoryRecordStore::new();
        assert!(store.delete("status", "nobody@nowhere").is_ok());
        assert!(store.is_empty());
    }
}
