//! # Secure Storage Facade
//!
//! Thin adapter over an encrypted backing store with a transparent plain
//! fallback, so callers never need to know which tier actually held a
//! value.
//!
//! ## Fallback Decision
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  SecureStorage Call Path                                │
//! │                                                                         │
//! │  set / get / delete / clear                                             │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  availability probe (EVERY call, not cached):                           │
//! │    write probe key ──► read back ──► equal?                             │
//! │         │                                                               │
//! │         ├── yes ──► encrypted backing (keyring)                         │
//! │         │                                                               │
//! │         └── no ───► plain backing (file store)                          │
//! │                                                                         │
//! │  Any failure on the chosen backing is caught, logged, and returned      │
//! │  as false / None. This type NEVER returns an error.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Re-probing per call trades a little latency for never getting stuck on
//! a false negative from a transient keyring failure.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::kv::KeyValueStore;

/// Probe key written to the encrypted backing to test availability.
const PROBE_KEY: &str = "secure_store_probe";
const PROBE_VALUE: &str = "ok";

/// Encrypted-with-fallback storage for opaque string blobs.
pub struct SecureStorage {
    /// Encrypted backing. `None` when the platform has none (or the app
    /// is configured plain-only), which makes every call take the
    /// fallback path without probing.
    encrypted: Option<Arc<dyn KeyValueStore>>,

    /// Plain persistent fallback.
    fallback: Arc<dyn KeyValueStore>,
}

impl SecureStorage {
    pub fn new(encrypted: Arc<dyn KeyValueStore>, fallback: Arc<dyn KeyValueStore>) -> Self {
        SecureStorage {
            encrypted: Some(encrypted),
            fallback,
        }
    }

    /// A facade with no encrypted tier at all (browser-class targets,
    /// or the `plain_storage_only` config switch).
    pub fn plain_only(fallback: Arc<dyn KeyValueStore>) -> Self {
        SecureStorage {
            encrypted: None,
            fallback,
        }
    }

    /// Picks the backing for this call: the encrypted tier when the
    /// probe round-trips, the fallback otherwise.
    async fn backing(&self) -> &Arc<dyn KeyValueStore> {
        let Some(encrypted) = &self.encrypted else {
            return &self.fallback;
        };

        let available = match encrypted.set_item(PROBE_KEY, PROBE_VALUE).await {
            Ok(()) => matches!(
                encrypted.get_item(PROBE_KEY).await,
                Ok(Some(v)) if v == PROBE_VALUE
            ),
            Err(e) => {
                debug!(error = %e, "encrypted storage probe write failed");
                false
            }
        };

        if available {
            encrypted
        } else {
            debug!("encrypted storage unavailable, using plain fallback");
            &self.fallback
        }
    }

    /// Stores a value. Returns false (and logs) on failure; never errors.
    pub async fn set(&self, key: &str, value: &str) -> bool {
        match self.backing().await.set_item(key, value).await {
            Ok(()) => true,
            Err(e) => {
                warn!(key, error = %e, "failed to store value securely");
                false
            }
        }
    }

    /// Retrieves a value. Returns None on absence or any failure.
    pub async fn get(&self, key: &str) -> Option<String> {
        match self.backing().await.get_item(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "failed to read value from secure storage");
                None
            }
        }
    }

    /// Deletes a value. Absent keys count as success.
    pub async fn delete(&self, key: &str) -> bool {
        match self.backing().await.remove_item(key).await {
            Ok(()) => true,
            Err(e) => {
                warn!(key, error = %e, "failed to delete value from secure storage");
                false
            }
        }
    }

    /// Clears the chosen backing. Use with caution: this removes all
    /// stored credentials in that tier.
    pub async fn clear(&self) -> bool {
        match self.backing().await.clear().await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "failed to clear secure storage");
                false
            }
        }
    }
}
