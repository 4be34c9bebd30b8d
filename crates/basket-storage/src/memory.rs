//! # Memory Store
//!
//! HashMap-backed [`KeyValueStore`] for tests and ephemeral runs. Nothing
//! survives the process; the contract is otherwise identical to the
//! durable stores.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::StorageResult;
use crate::kv::KeyValueStore;

/// In-memory key-value store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Number of stored keys. Test helper.
    pub fn len(&self) -> usize {
        self.entries.lock().expect("memory store poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        self.entries
            .lock()
            .expect("memory store poisoned")
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self
            .entries
            .lock()
            .expect("memory store poisoned")
            .get(key)
            .cloned())
    }

    async fn remove_item(&self, key: &str) -> StorageResult<()> {
        self.entries
            .lock()
            .expect("memory store poisoned")
            .remove(key);
        Ok(())
    }

    async fn clear(&self) -> StorageResult<()> {
        self.entries.lock().expect("memory store poisoned").clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_contract() {
        let store = MemoryStore::new();

        assert!(store.get_item("k").await.unwrap().is_none());
        store.set_item("k", "v").await.unwrap();
        assert_eq!(store.get_item("k").await.unwrap().as_deref(), Some("v"));

        store.remove_item("k").await.unwrap();
        store.remove_item("k").await.unwrap();
        assert!(store.get_item("k").await.unwrap().is_none());

        store.set_item("a", "1").await.unwrap();
        store.set_item("b", "2").await.unwrap();
        store.clear().await.unwrap();
        assert!(store.is_empty());
    }
}
