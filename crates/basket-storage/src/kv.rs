//! # Key-Value Store Trait
//!
//! The four-method shape every storage backing implements. Values are
//! opaque strings; callers own serialization.

use async_trait::async_trait;

use crate::error::StorageResult;

/// A persistent (or test-scoped) string key-value store.
///
/// ## Contract
/// - `get_item` of a never-written or removed key returns `Ok(None)`
/// - `remove_item` of an absent key is a successful no-op
/// - `set_item` of an existing key overwrites it
///
/// Object-safe so stores can be passed around as `Arc<dyn KeyValueStore>`.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;

    async fn get_item(&self, key: &str) -> StorageResult<Option<String>>;

    async fn remove_item(&self, key: &str) -> StorageResult<()>;

    /// Removes every key in this store's namespace.
    async fn clear(&self) -> StorageResult<()>;
}
