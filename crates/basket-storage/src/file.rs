//! # File Store
//!
//! Plain persistent key-value store: one file per key under a namespace
//! directory. This is the fallback tier for secure storage and the
//! backing for all three persisted state stores.
//!
//! ## Durability
//! Writes go to a sibling temp file first and are renamed into place, so
//! a crash mid-write leaves the previous value intact rather than a
//! truncated blob.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::error::{StorageError, StorageResult};
use crate::kv::KeyValueStore;

/// File-per-key store rooted at a namespace directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `root`. The directory is created lazily
    /// on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(encode_key(key))
    }
}

/// Encodes a key into a filesystem-safe file name.
///
/// Alphanumerics plus `-`, `_`, `.` pass through; every other byte is
/// escaped as `%XX`. The escape is injective (`%` itself is escaped), so
/// two distinct keys never collide on disk.
fn encode_key(key: &str) -> String {
    let mut name = String::with_capacity(key.len());
    for byte in key.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' | b'.' => {
                name.push(byte as char);
            }
            other => {
                name.push_str(&format!("%{other:02X}"));
            }
        }
    }
    name
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| StorageError::io(self.root.display().to_string(), e))?;

        let path = self.path_for(key);
        // "%TM" is never produced by encode_key (escapes are %<hex><hex>),
        // so the temp name cannot collide with any encoded key.
        let tmp = self.root.join(format!("%TMP%{}", encode_key(key)));

        tokio::fs::write(&tmp, value)
            .await
            .map_err(|e| StorageError::io(tmp.display().to_string(), e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| StorageError::io(path.display().to_string(), e))?;

        debug!(key, bytes = value.len(), "file store wrote key");
        Ok(())
    }

    async fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.path_for(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io(path.display().to_string(), e)),
        }
    }

    async fn remove_item(&self, key: &str) -> StorageResult<()> {
        let path = self.path_for(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::io(path.display().to_string(), e)),
        }
    }

    async fn clear(&self) -> StorageResult<()> {
        match tokio::fs::remove_dir_all(&self.root).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(StorageError::io(self.root.display().to_string(), e)),
        }
        debug!(root = %self.root.display(), "file store cleared");
        Ok(())
    }
}
