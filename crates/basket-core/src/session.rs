//! # Session Record
//!
//! The serialized shape of a signed-in session: auth token, refresh token,
//! absolute expiry, and a cached copy of the user's profile for offline /
//! startup use.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    SessionRecord Lifecycle                              │
//! │                                                                         │
//! │  sign-in / sign-up ──────► created (tokens + expiry + profile)          │
//! │                                                                         │
//! │  token refresh ──────────► overwritten wholesale (no field merge)       │
//! │                                                                         │
//! │  sign-out ───────────────► deleted in full                              │
//! │                                                                         │
//! │  startup reconciliation ─► deleted when found invalid                   │
//! │                                                                         │
//! │  An expired record can still be physically present in storage until     │
//! │  explicitly cleared; it must never be treated as authenticated.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::CoreError;

/// Open-ended per-user preferences (theme, language, notification flag,
/// plus whatever future versions add).
///
/// Stored as a string → JSON map so older persisted profiles keep loading
/// when new preference keys appear.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Preferences(pub BTreeMap<String, Value>);

impl Preferences {
    /// Preference key for the theme choice ("light" | "dark" | "system").
    pub const THEME: &'static str = "theme";
    /// Preference key for the language code.
    pub const LANGUAGE: &'static str = "language";
    /// Preference key for the notifications opt-in flag.
    pub const NOTIFICATIONS: &'static str = "notifications";

    pub fn theme(&self) -> Option<&str> {
        self.0.get(Self::THEME).and_then(Value::as_str)
    }

    pub fn language(&self) -> Option<&str> {
        self.0.get(Self::LANGUAGE).and_then(Value::as_str)
    }

    pub fn notifications_enabled(&self) -> Option<bool> {
        self.0.get(Self::NOTIFICATIONS).and_then(Value::as_bool)
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }
}

/// Cached identity of the signed-in user.
///
/// Two copies of this exist at runtime: the one embedded in the
/// [`SessionRecord`] (for offline/startup use) and the authoritative copy
/// in the profile store, refreshed from the remote service after every
/// auth-state change. They converge after a successful fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    /// Stable identity key, owned by the remote service. Immutable.
    pub id: String,

    pub email: String,

    pub full_name: Option<String>,

    pub preferences: Preferences,
}

/// The serialized session record.
///
/// ## Invariant
/// `auth_token` is present iff `expires_at` is present. A record with
/// `expires_at` in the past is invalid and must not be treated as
/// authenticated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionRecord {
    /// Bearer credential for the remote service.
    pub auth_token: Option<String>,

    /// Used to mint a new auth token when expired.
    pub refresh_token: Option<String>,

    /// Absolute expiry. Serialized as integer milliseconds (the layout
    /// the app has always persisted).
    #[serde(with = "chrono::serde::ts_milliseconds_option")]
    pub expires_at: Option<DateTime<Utc>>,

    /// Denormalized cache of the authenticated identity.
    pub user: Option<UserProfile>,
}

impl SessionRecord {
    /// Builds an authenticated record. Token and expiry travel together,
    /// so the pairing invariant holds by construction.
    pub fn authenticated(
        auth_token: String,
        refresh_token: Option<String>,
        expires_at: DateTime<Utc>,
        user: UserProfile,
    ) -> Self {
        SessionRecord {
            auth_token: Some(auth_token),
            refresh_token,
            expires_at: Some(expires_at),
            user: Some(user),
        }
    }

    /// Checks the token/expiry pairing invariant. Deserialized blobs can
    /// violate it (hand-edited storage, interrupted legacy migration), so
    /// loaders call this before trusting a record.
    pub fn check_consistency(&self) -> Result<(), CoreError> {
        match (&self.auth_token, &self.expires_at) {
            (Some(_), None) => Err(CoreError::InconsistentSession {
                reason: "auth token present without expiry".to_string(),
            }),
            (None, Some(_)) => Err(CoreError::InconsistentSession {
                reason: "expiry present without auth token".to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// True when the record carries a token that expires after `now`.
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        match (&self.auth_token, self.expires_at) {
            (Some(_), Some(expires_at)) => expires_at > now,
            _ => false,
        }
    }

    /// Whole seconds until expiry. Never negative; 0 when there is no
    /// valid expiry or it has already passed.
    pub fn time_remaining_secs(&self, now: DateTime<Utc>) -> u64 {
        match self.expires_at {
            Some(expires_at) if expires_at > now => {
                let ms = (expires_at - now).num_milliseconds();
                (ms / 1000).max(0) as u64
            }
            _ => 0,
        }
    }
}
