//! # Error Types
//!
//! Domain-specific error types for basket-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  basket-core errors (this file)                                        │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  basket-storage errors (separate crate)                                │
//! │  └── StorageError     - Durable key-value failures                     │
//! │                                                                         │
//! │  basket-session errors (separate crate)                                │
//! │  ├── BackendError     - Remote auth service failures                   │
//! │  └── AuthError        - Sign-in/up/out orchestration failures          │
//! │                                                                         │
//! │  Flow: ValidationError → AuthError → caller (UI renders inline)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product id, field name, etc.)
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core domain errors.
///
/// These errors represent domain rule violations. They should be caught
/// and translated to user-friendly messages by the caller.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A session record violates the token/expiry pairing invariant.
    ///
    /// ## When This Occurs
    /// - A persisted blob carries an auth token but no expiry (or vice versa),
    ///   e.g. after a partial legacy-key migration on an old install
    #[error("Session record is inconsistent: {reason}")]
    InconsistentSession { reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early, per-field validation before any backend call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Invalid format (e.g., malformed email address).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// The field this error is attached to, for inline per-field rendering.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooShort { field, .. }
            | ValidationError::TooLong { field, .. }
            | ValidationError::InvalidFormat { field, .. } => field,
        }
    }
}
