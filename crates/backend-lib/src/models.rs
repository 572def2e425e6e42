//! Persistent records and the inputs used to create them.
use assetreg_common::format_cents;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// A registered account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)] // Never leaves the server
    pub password_hash: String,
}

/// A registered asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Asset {
    pub id: i64,
    /// Owning user
    pub user_id: i64,
    pub name: String,
    pub description: String,
    /// Unique when present
    pub serial_number: Option<String>,
    /// Non-negative value in cents
    pub value_cents: Option<i64>,
    /// Unique, assigned once on first save
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

impl Asset {
    /// Path of the public detail page
    pub fn public_url(&self) -> String {
        format!("/asset/{}/", self.slug)
    }

    /// Value rendered with two decimals, if the asset has one
    pub fn display_value(&self) -> Option<String> {
        self.value_cents.map(format_cents)
    }
}

/// Validated data for a new account
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    /// Trimmed and lowercased
    pub email: String,
    pub password_hash: String,
}

/// Validated data for a new asset; the slug is assigned on save
#[derive(Debug, Clone)]
pub struct NewAsset {
    pub user_id: i64,
    pub name: String,
    pub description: String,
    pub serial_number: Option<String>,
    pub value_cents: Option<i64>,
}
