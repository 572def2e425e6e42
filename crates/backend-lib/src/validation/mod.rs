// ============================
// crates/backend-lib/src/validation/mod.rs
// ============================
//! Field validation for submitted forms.

use assetreg_common::{parse_amount, MoneyError};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

use crate::auth::{validate_password_strength, PasswordRequirements};

// Common validation constants
pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MAX_USERNAME_LENGTH: usize = 80;
pub const MIN_ASSET_NAME_LENGTH: usize = 5;
pub const MAX_ASSET_NAME_LENGTH: usize = 100;
pub const MIN_DESCRIPTION_LENGTH: usize = 10;
pub const MAX_SERIAL_NUMBER_LENGTH: usize = 50;
const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321 SMTP limit

// Regex patterns for validation
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9-]+(\.[a-zA-Z0-9-]+)*\.[a-zA-Z]{2,}$").unwrap()
});

/// Possible validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("This field is required.")]
    Required,

    #[error("Field must be between {min} and {max} characters long.")]
    Length { min: usize, max: usize },

    #[error("Field must be at least {0} characters long.")]
    TooShort(usize),

    #[error("Field cannot be longer than {0} characters.")]
    TooLong(usize),

    #[error("Invalid email address.")]
    InvalidEmail,

    #[error("Passwords must match.")]
    PasswordMismatch,

    #[error("{0}")]
    WeakPassword(String),

    #[error("{0}")]
    InvalidValue(#[from] MoneyError),
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

fn char_len(value: &str) -> usize {
    value.chars().count()
}

fn required(value: &str) -> ValidationResult<&str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Required);
    }
    Ok(value)
}

/// Validate a username, returning it trimmed
pub fn validate_username(username: &str) -> ValidationResult<&str> {
    let username = required(username)?;
    let len = char_len(username);
    if !(MIN_USERNAME_LENGTH..=MAX_USERNAME_LENGTH).contains(&len) {
        return Err(ValidationError::Length {
            min: MIN_USERNAME_LENGTH,
            max: MAX_USERNAME_LENGTH,
        });
    }
    Ok(username)
}

/// Validate an email address, returning its normalised form
pub fn validate_email(email: &str) -> ValidationResult<String> {
    let email = required(email)?;
    if email.len() > MAX_EMAIL_LENGTH || !EMAIL_REGEX.is_match(email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(normalize_email(email))
}

/// Canonical form used for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate a new password against the configured requirements
pub fn validate_password_fields<'a>(
    password: &'a str,
    requirements: &PasswordRequirements,
) -> ValidationResult<&'a str> {
    if password.is_empty() {
        return Err(ValidationError::Required);
    }
    if !validate_password_strength(password, requirements) {
        return Err(ValidationError::WeakPassword(requirements.describe()));
    }
    Ok(password)
}

/// Validate an asset's display name
pub fn validate_asset_name(name: &str) -> ValidationResult<&str> {
    let name = required(name)?;
    let len = char_len(name);
    if !(MIN_ASSET_NAME_LENGTH..=MAX_ASSET_NAME_LENGTH).contains(&len) {
        return Err(ValidationError::Length {
            min: MIN_ASSET_NAME_LENGTH,
            max: MAX_ASSET_NAME_LENGTH,
        });
    }
    Ok(name)
}

/// Validate an asset description
pub fn validate_description(description: &str) -> ValidationResult<&str> {
    let description = required(description)?;
    if char_len(description) < MIN_DESCRIPTION_LENGTH {
        return Err(ValidationError::TooShort(MIN_DESCRIPTION_LENGTH));
    }
    Ok(description)
}

/// Validate an optional serial number; blank means absent
pub fn validate_serial_number(serial: &str, required_field: bool) -> ValidationResult<Option<&str>> {
    let serial = serial.trim();
    if serial.is_empty() {
        return if required_field {
            Err(ValidationError::Required)
        } else {
            Ok(None)
        };
    }
    if char_len(serial) > MAX_SERIAL_NUMBER_LENGTH {
        return Err(ValidationError::TooLong(MAX_SERIAL_NUMBER_LENGTH));
    }
    Ok(Some(serial))
}

/// Validate an optional monetary value, returning cents; blank means absent
pub fn validate_value(value: &str, required_field: bool) -> ValidationResult<Option<i64>> {
    if value.trim().is_empty() {
        return if required_field {
            Err(ValidationError::Required)
        } else {
            Ok(None)
        };
    }
    Ok(Some(parse_amount(value)?))
}

/// Sanitize a string for HTML output
pub fn sanitize_string(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
