// ============================
// assetreg-backend-lib/src/forms.rs
// ============================
//! Submitted HTML forms and their validation.
use std::collections::BTreeMap;

use assetreg_common::AssetVariant;
use serde::Deserialize;

use crate::auth::PasswordRequirements;
use crate::models::NewAsset;
use crate::validation::{
    normalize_email, validate_asset_name, validate_description, validate_email,
    validate_password_fields, validate_serial_number, validate_username, validate_value,
    ValidationError,
};

/// Per-field messages plus form-level messages
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FormErrors {
    fields: BTreeMap<&'static str, String>,
    general: Vec<String>,
}

impl FormErrors {
    pub fn field(&mut self, name: &'static str, error: ValidationError) {
        self.fields.entry(name).or_insert_with(|| error.to_string());
    }

    /// Attach a message that did not come from field validation
    pub fn field_message(&mut self, name: &'static str, message: impl Into<String>) {
        self.fields.insert(name, message.into());
    }

    pub fn general(&mut self, message: impl Into<String>) {
        self.general.push(message.into());
    }

    /// Form-level error built from one message
    pub fn message(message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.general(message);
        errors
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn general_messages(&self) -> &[String] {
        &self.general
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.general.is_empty()
    }
}

/// Collect `result` into `errors` under `name`
fn check<T>(errors: &mut FormErrors, name: &'static str, result: Result<T, ValidationError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            errors.field(name, error);
            None
        },
    }
}

/// `/signup`
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub password2: Option<String>,
}

/// A signup that passed validation
#[derive(Debug, Clone)]
pub struct ValidSignup {
    pub username: String,
    /// Normalised
    pub email: String,
    pub password: String,
}

impl SignupForm {
    pub fn validate(&self, requirements: &PasswordRequirements) -> Result<ValidSignup, FormErrors> {
        let mut errors = FormErrors::default();

        let username = check(&mut errors, "username", validate_username(&self.username));
        let email = check(&mut errors, "email", validate_email(&self.email));
        let password = check(
            &mut errors,
            "password",
            validate_password_fields(&self.password, requirements),
        );
        if let Some(repeat) = &self.password2 {
            if *repeat != self.password {
                errors.field("password2", ValidationError::PasswordMismatch);
            }
        }

        match (username, email, password) {
            (Some(username), Some(email), Some(password)) if errors.is_empty() => Ok(ValidSignup {
                username: username.to_string(),
                email,
                password: password.to_string(),
            }),
            _ => Err(errors),
        }
    }
}

/// `/login`
#[derive(Debug, Default, Clone, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    /// Checkbox; browsers send it only when ticked
    pub remember_me: Option<String>,
}

impl LoginForm {
    pub fn remember(&self) -> bool {
        matches!(
            self.remember_me.as_deref().map(str::trim),
            Some("y" | "on" | "true" | "1" | "yes")
        )
    }

    /// Presence checks only, returning the normalised email
    pub fn validate(&self) -> Result<String, FormErrors> {
        let mut errors = FormErrors::default();
        if self.email.trim().is_empty() {
            errors.field("email", ValidationError::Required);
        }
        if self.password.is_empty() {
            errors.field("password", ValidationError::Required);
        }
        if errors.is_empty() {
            Ok(normalize_email(&self.email))
        } else {
            Err(errors)
        }
    }
}

/// `/admin/asset/new`
#[derive(Debug, Default, Clone, Deserialize)]
pub struct AssetForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub serial_number: String,
    #[serde(default)]
    pub value: String,
}

impl AssetForm {
    /// Validate for `variant`, which decides whether the serial number or the value is required
    pub fn validate(&self, variant: AssetVariant, owner: i64) -> Result<NewAsset, FormErrors> {
        let mut errors = FormErrors::default();

        let name = check(&mut errors, "name", validate_asset_name(&self.name));
        let description = check(
            &mut errors,
            "description",
            validate_description(&self.description),
        );
        let serial_number = check(
            &mut errors,
            "serial_number",
            validate_serial_number(&self.serial_number, variant.requires_serial_number()),
        )
        .flatten()
        .map(str::to_string);
        let value_cents = check(
            &mut errors,
            "value",
            validate_value(&self.value, variant.requires_value()),
        )
        .flatten();

        match (name, description) {
            (Some(name), Some(description)) if errors.is_empty() => Ok(NewAsset {
                user_id: owner,
                name: name.to_string(),
                description: description.to_string(),
                serial_number,
                value_cents,
            }),
            _ => Err(errors),
        }
    }
}
