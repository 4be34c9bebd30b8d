//! Error types for session management and authentication.

use basket_core::error::ValidationError;
use thiserror::Error;

/// Failures reported by an [`AuthBackend`](crate::AuthBackend)
/// implementation.
///
/// The orchestrator only branches on a handful of these; the rest are
/// surfaced to callers so the UI layer can render them.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("email address is not confirmed")]
    EmailNotConfirmed,

    #[error("an account with this email already exists")]
    EmailTaken,

    #[error("network error: {0}")]
    Network(String),

    #[error("auth service error: {0}")]
    Service(String),
}

/// Failures surfaced by the auth orchestrator.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Credentials were rejected locally before any network call.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The remote backend rejected or failed the operation.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// The backend accepted the sign-in but the session record could
    /// not be written to local storage. Treated as fatal at sign-in
    /// time: a session that does not survive a restart is not a
    /// session.
    #[error("session could not be persisted to local storage")]
    SessionNotPersisted,
}

pub type AuthResult<T> = Result<T, AuthError>;
