//! # Validation Module
//!
//! Per-field input validation for the authentication forms. These checks
//! run *before* any backend call, so malformed input never costs a
//! network round trip and errors can be rendered inline next to the
//! offending field.
//!
//! ## Usage
//! ```rust
//! use basket_core::validation::{validate_email, validate_password};
//!
//! assert!(validate_email("user@example.com").is_ok());
//! assert!(validate_password("correct horse").is_ok());
//! assert!(validate_email("not-an-email").is_err());
//! ```

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Minimum password length accepted by the remote auth service.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Maximum length accepted for free-text name fields.
pub const MAX_NAME_LEN: usize = 100;

/// Validates an email address.
///
/// ## Rules
/// - Must not be empty
/// - Must contain exactly one `@` with a non-empty local part
/// - The domain must contain a dot and no whitespace
///
/// This is a plausibility check, not RFC 5322; the remote service is the
/// final authority.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next().unwrap_or_default();

    if local.is_empty()
        || domain.is_empty()
        || domain.contains('@')
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
        || email.chars().any(char::is_whitespace)
    {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "expected name@domain.tld".to_string(),
        });
    }

    Ok(())
}

/// Validates a password.
///
/// ## Rules
/// - Must not be empty
/// - Must be at least [`MIN_PASSWORD_LEN`] characters
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::Required {
            field: "password".to_string(),
        });
    }

    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LEN,
        });
    }

    Ok(())
}

/// Validates an optional full name supplied at sign-up.
///
/// `None` is fine (the field is optional); when present it must be
/// non-blank and within [`MAX_NAME_LEN`] characters.
pub fn validate_full_name(full_name: Option<&str>) -> ValidationResult<()> {
    let Some(name) = full_name else {
        return Ok(());
    };

    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "fullName".to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "fullName".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}
