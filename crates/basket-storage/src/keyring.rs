//! # Keyring Store
//!
//! Encrypted key-value backing over the platform credential store:
//! - Linux: Secret Service (GNOME Keyring, KWallet)
//! - macOS: Keychain
//! - Windows: Credential Manager
//!
//! The `keyring` API is blocking, so every call is moved onto the
//! blocking thread pool with `spawn_blocking`.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use keyring::Entry;
use tracing::debug;

use crate::error::{StorageError, StorageResult};
use crate::kv::KeyValueStore;

/// OS-keyring-backed store, scoped by service name and namespace.
#[derive(Debug)]
pub struct KeyringStore {
    service: String,
    namespace: String,
    /// Keys written through this instance. The OS keyring cannot
    /// enumerate entries, so `clear` can only remove what we wrote.
    written: Mutex<HashSet<String>>,
}

impl KeyringStore {
    /// Creates a store under `service` (the application's keyring service
    /// name) and `namespace` (entry-name prefix, e.g. "session").
    pub fn new(service: impl Into<String>, namespace: impl Into<String>) -> Self {
        KeyringStore {
            service: service.into(),
            namespace: namespace.into(),
            written: Mutex::new(HashSet::new()),
        }
    }

    fn entry_name(&self, key: &str) -> String {
        format!("{}_{}", self.namespace, key)
    }

    fn remember(&self, key: &str) {
        self.written
            .lock()
            .expect("keyring index poisoned")
            .insert(key.to_string());
    }

    fn forget(&self, key: &str) {
        self.written
            .lock()
            .expect("keyring index poisoned")
            .remove(key);
    }
}

/// Runs a blocking keyring operation off the async runtime.
async fn blocking<T, F>(op: F) -> StorageResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, keyring::Error> + Send + 'static,
{
    tokio::task::spawn_blocking(op)
        .await
        .map_err(|e| StorageError::Task(e.to_string()))?
        .map_err(StorageError::from)
}

#[async_trait]
impl KeyValueStore for KeyringStore {
    async fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        let service = self.service.clone();
        let name = self.entry_name(key);
        let value = value.to_string();

        blocking(move || Entry::new(&service, &name)?.set_password(&value)).await?;
        self.remember(key);
        debug!(key, "keyring store wrote entry");
        Ok(())
    }

    async fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        let service = self.service.clone();
        let name = self.entry_name(key);

        blocking(move || match Entry::new(&service, &name)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e),
        })
        .await
    }

    async fn remove_item(&self, key: &str) -> StorageResult<()> {
        let service = self.service.clone();
        let name = self.entry_name(key);

        blocking(move || match Entry::new(&service, &name)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e),
        })
        .await?;
        self.forget(key);
        Ok(())
    }

    async fn clear(&self) -> StorageResult<()> {
        let keys: Vec<String> = self
            .written
            .lock()
            .expect("keyring index poisoned")
            .iter()
            .cloned()
            .collect();

        for key in keys {
            self.remove_item(&key).await?;
        }
        debug!(namespace = %self.namespace, "keyring store cleared written entries");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Keyring access needs a live OS credential service, which CI boxes
    // don't have; only the pure naming logic is tested here.
    #[test]
    fn test_entry_name_is_namespaced() {
        let store = KeyringStore::new("basket", "session");
        assert_eq!(store.entry_name("auth_token"), "session_auth_token");
    }
}
