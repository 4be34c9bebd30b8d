//! The seam to the remote identity provider.
//!
//! Everything the orchestrator needs from the outside world goes
//! through [`AuthBackend`]. The facade crate supplies a real
//! implementation; tests supply mocks. Keeping the trait narrow is
//! deliberate: the rest of the crate must not grow a dependency on any
//! particular provider's API shape.

use async_trait::async_trait;
use basket_core::session::{SessionRecord, UserProfile};
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

use crate::error::BackendError;

/// The identity the backend reports for an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub full_name: Option<String>,
}

impl AuthUser {
    /// A minimal profile derived from backend identity alone, used
    /// until the full profile row has been fetched.
    pub fn to_profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            email: self.email.clone(),
            full_name: self.full_name.clone(),
            preferences: Default::default(),
        }
    }
}

/// A live session as the backend describes it.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub user: AuthUser,
}

impl AuthSession {
    /// The durable record we persist for this session.
    pub fn to_record(&self) -> SessionRecord {
        SessionRecord::authenticated(
            self.access_token.clone(),
            self.refresh_token.clone(),
            self.expires_at,
            self.user.to_profile(),
        )
    }
}

/// Result of a sign-up attempt. Providers that require email
/// confirmation return the created user without a session; the caller
/// is then not authenticated until the confirmation round-trip
/// completes.
#[derive(Debug, Clone)]
pub struct SignUpOutcome {
    pub user: AuthUser,
    pub session: Option<AuthSession>,
}

/// Session transitions pushed by the backend after initialization,
/// e.g. a token refresh or a sign-out performed on another surface.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    SignedIn(AuthSession),
    Refreshed(AuthSession),
    SignedOut,
}

/// Remote identity provider operations.
///
/// ## Behavior
///
/// - `get_session` and `set_session` return `Ok(None)` when the
///   backend holds no session; errors are reserved for transport and
///   service failures.
/// - `subscribe` hands out an independent receiver per call. Events
///   published before the call are not replayed.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, BackendError>;

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> Result<SignUpOutcome, BackendError>;

    async fn sign_out(&self) -> Result<(), BackendError>;

    /// The backend's own view of the current session, refreshing it
    /// if the provider supports that.
    async fn get_session(&self) -> Result<Option<AuthSession>, BackendError>;

    /// Hand a cached token pair back to the backend so its client
    /// state matches ours. Returns the (possibly refreshed) session
    /// the backend settled on.
    async fn set_session(
        &self,
        access_token: &str,
        refresh_token: Option<&str>,
    ) -> Result<Option<AuthSession>, BackendError>;

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent>;

    async fn fetch_profile(&self, user_id: &str) -> Result<Option<UserProfile>, BackendError>;

    async fn update_profile(&self, profile: &UserProfile) -> Result<(), BackendError>;

    async fn fetch_settings(
        &self,
        user_id: &str,
    ) -> Result<Option<serde_json::Value>, BackendError>;

    async fn save_settings(
        &self,
        user_id: &str,
        settings: &serde_json::Value,
    ) -> Result<(), BackendError>;
}
