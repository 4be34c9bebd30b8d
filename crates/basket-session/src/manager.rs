//! Durable session record management.
//!
//! The session is stored as a single JSON blob under one key. Earlier
//! builds spread it over four keys (token, refresh token, expiry,
//! cached user), which made partial writes observable as inconsistent
//! sessions; [`SessionManager::migrate_legacy_keys`] folds that layout
//! into the blob once and deletes the stragglers.
//!
//! ## Behavior
//!
//! - `save_session` is the only operation that can fail: if the record
//!   cannot be written the caller must know, because the session will
//!   not survive a restart.
//! - `load_session` never fails. Missing, corrupt, and inconsistent
//!   records all load as `None`, with a warning for the latter two.
//! - `clear_session` always removes every key this crate has ever
//!   used, current and legacy, so no stale credential outlives a
//!   sign-out.

use basket_core::session::{SessionRecord, UserProfile};
use basket_storage::SecureStorage;
use chrono::{DateTime, TimeZone, Utc};
use tracing::{info, warn};

use crate::error::{AuthError, AuthResult};

/// Key holding the single-blob session record.
pub const SESSION_KEY: &str = "basket_session";

/// Per-field keys used by the pre-blob layout. Read once during
/// migration, deleted on every clear.
pub const LEGACY_AUTH_TOKEN_KEY: &str = "basket_auth_token";
pub const LEGACY_REFRESH_TOKEN_KEY: &str = "basket_refresh_token";
pub const LEGACY_EXPIRY_KEY: &str = "basket_session_expiry";
pub const LEGACY_USER_DATA_KEY: &str = "basket_user_data";

/// Reads and writes the persisted session through [`SecureStorage`].
pub struct SessionManager {
    storage: SecureStorage,
}

impl SessionManager {
    pub fn new(storage: SecureStorage) -> Self {
        Self { storage }
    }

    /// Persist `record` as the current session.
    pub async fn save_session(&self, record: &SessionRecord) -> AuthResult<()> {
        if let Err(err) = record.check_consistency() {
            warn!(%err, "refusing to persist inconsistent session record");
            return Err(AuthError::SessionNotPersisted);
        }
        let blob = serde_json::to_string(record)
            .map_err(|_| AuthError::SessionNotPersisted)?;
        if self.storage.set(SESSION_KEY, &blob).await {
            Ok(())
        } else {
            Err(AuthError::SessionNotPersisted)
        }
    }

    /// The persisted session, if a readable and internally consistent
    /// one exists.
    pub async fn load_session(&self) -> Option<SessionRecord> {
        let blob = self.storage.get(SESSION_KEY).await?;
        let record: SessionRecord = match serde_json::from_str(&blob) {
            Ok(record) => record,
            Err(err) => {
                warn!(%err, "discarding unreadable session record");
                return None;
            }
        };
        if let Err(err) = record.check_consistency() {
            warn!(%err, "discarding inconsistent session record");
            return None;
        }
        Some(record)
    }

    /// Remove every session key, current and legacy, unconditionally.
    pub async fn clear_session(&self) {
        for key in [
            SESSION_KEY,
            LEGACY_AUTH_TOKEN_KEY,
            LEGACY_REFRESH_TOKEN_KEY,
            LEGACY_EXPIRY_KEY,
            LEGACY_USER_DATA_KEY,
        ] {
            self.storage.delete(key).await;
        }
    }

    /// Whether a persisted session exists and has not expired.
    pub async fn is_session_valid(&self) -> bool {
        match self.load_session().await {
            Some(record) => record.is_valid(Utc::now()),
            None => false,
        }
    }

    /// Seconds until the persisted session expires. Zero when there is
    /// no session or it has already expired.
    pub async fn session_time_remaining_secs(&self) -> u64 {
        match self.load_session().await {
            Some(record) => record.time_remaining_secs(Utc::now()),
            None => 0,
        }
    }

    /// Replace the cached profile inside the persisted record. A
    /// failure here only loses profile freshness, not the session, so
    /// it is logged rather than surfaced.
    pub async fn update_cached_profile(&self, profile: &UserProfile) {
        let Some(mut record) = self.load_session().await else {
            return;
        };
        record.user = Some(profile.clone());
        if self.save_session(&record).await.is_err() {
            warn!("failed to refresh cached profile in session record");
        }
    }

    /// One-time upgrade from the per-field key layout to the single
    /// blob. Runs at startup before the session is first read.
    ///
    /// A legacy token without an expiry (or the reverse) is dropped
    /// rather than migrated: a half-written pair is exactly the state
    /// the blob layout exists to rule out.
    pub async fn migrate_legacy_keys(&self) {
        if self.storage.get(SESSION_KEY).await.is_some() {
            // Already on the blob layout; just sweep leftovers.
            self.remove_legacy_keys().await;
            return;
        }

        let token = self.storage.get(LEGACY_AUTH_TOKEN_KEY).await;
        let refresh = self.storage.get(LEGACY_REFRESH_TOKEN_KEY).await;
        let expiry = self
            .storage
            .get(LEGACY_EXPIRY_KEY)
            .await
            .and_then(|raw| parse_expiry(&raw));
        let user = self
            .storage
            .get(LEGACY_USER_DATA_KEY)
            .await
            .and_then(|raw| serde_json::from_str::<UserProfile>(&raw).ok());

        if token.is_none() && refresh.is_none() && expiry.is_none() && user.is_none() {
            return;
        }

        match (token, expiry) {
            (Some(token), Some(expiry)) => {
                let record = SessionRecord {
                    auth_token: Some(token),
                    refresh_token: refresh,
                    expires_at: Some(expiry),
                    user,
                };
                match self.save_session(&record).await {
                    Ok(()) => info!("migrated legacy session keys to single record"),
                    Err(err) => warn!(%err, "failed to migrate legacy session keys"),
                }
            }
            _ => {
                warn!("dropping incomplete legacy session during migration");
            }
        }
        self.remove_legacy_keys().await;
    }

    async fn remove_legacy_keys(&self) {
        for key in [
            LEGACY_AUTH_TOKEN_KEY,
            LEGACY_REFRESH_TOKEN_KEY,
            LEGACY_EXPIRY_KEY,
            LEGACY_USER_DATA_KEY,
        ] {
            self.storage.delete(key).await;
        }
    }
}

/// Legacy expiry values were written as millisecond epoch strings.
fn parse_expiry(raw: &str) -> Option<DateTime<Utc>> {
    let millis: i64 = raw.trim().parse().ok()?;
    Utc.timestamp_millis_opt(millis).single()
}
