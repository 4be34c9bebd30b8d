//! # Storage Error Types
//!
//! Failures from the durable key-value tiers. `SecureStorage` swallows
//! these (log-and-degrade, per its contract); the plain stores surface
//! them so callers like the write-through persister can log with context.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Durable storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// OS credential store operation failed.
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    /// A background blocking task was cancelled or panicked.
    #[error("Storage task failed: {0}")]
    Task(String),
}

impl StorageError {
    pub(crate) fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }
}
