//! In-memory profile cache backed by the remote profile row.
//!
//! Holds the profile the UI renders from. The orchestrator seeds it
//! from the cached session record so something is available
//! immediately, then refreshes it from the backend in the background.

use std::sync::{Arc, RwLock};

use basket_core::session::UserProfile;
use tracing::debug;

use crate::backend::AuthBackend;
use crate::error::BackendError;

pub struct ProfileStore {
    backend: Arc<dyn AuthBackend>,
    profile: RwLock<Option<UserProfile>>,
}

impl ProfileStore {
    pub fn new(backend: Arc<dyn AuthBackend>) -> Arc<Self> {
        Arc::new(Self {
            backend,
            profile: RwLock::new(None),
        })
    }

    pub fn current(&self) -> Option<UserProfile> {
        self.profile.read().expect("profile lock poisoned").clone()
    }

    /// Seed the cache without touching the network. Used at startup
    /// with the profile copy embedded in the session record.
    pub fn seed(&self, profile: UserProfile) {
        *self.profile.write().expect("profile lock poisoned") = Some(profile);
    }

    pub fn clear(&self) {
        *self.profile.write().expect("profile lock poisoned") = None;
    }

    /// Fetch the authoritative profile row and replace the cache with
    /// it. Returns the fetched profile so the caller can also refresh
    /// the copy cached inside the session record.
    pub async fn refresh(&self, user_id: &str) -> Result<Option<UserProfile>, BackendError> {
        let fetched = self.backend.fetch_profile(user_id).await?;
        match &fetched {
            Some(profile) => {
                debug!(user_id, "refreshed profile from backend");
                self.seed(profile.clone());
            }
            None => debug!(user_id, "backend has no profile row for user"),
        }
        Ok(fetched)
    }

    /// Push a profile edit to the backend, updating the cache only
    /// after the write succeeds.
    pub async fn save(&self, profile: UserProfile) -> Result<(), BackendError> {
        self.backend.update_profile(&profile).await?;
        self.seed(profile);
        Ok(())
    }

    pub async fn load_settings(
        &self,
        user_id: &str,
    ) -> Result<Option<serde_json::Value>, BackendError> {
        self.backend.fetch_settings(user_id).await
    }

    pub async fn save_settings(
        &self,
        user_id: &str,
        settings: &serde_json::Value,
    ) -> Result<(), BackendError> {
        self.backend.save_settings(user_id, settings).await
    }
}
