// ============================
// assetreg-backend-lib/src/storage.rs
// ============================
//! Storage abstraction with an SQLite implementation.
use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Asset, NewAsset, NewUser, User};

mod schema;
mod sqlite;

pub use schema::SQLITE_INIT;
pub use sqlite::SqliteStorage;

/// Failures reported by a storage backend
#[derive(Error, Debug)]
pub enum StorageError {
    /// A unique index rejected the write; the transaction was rolled back
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StorageError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, StorageError::UniqueViolation(_))
    }
}

/// Trait for storage backends
#[async_trait]
pub trait Storage: Send + Sync {
    /// Create the schema if it does not exist yet
    async fn migrate(&self) -> Result<(), StorageError>;

    /// Insert a user. A taken email is reported as [`StorageError::UniqueViolation`].
    async fn create_user(&self, user: &NewUser) -> Result<User, StorageError>;

    async fn user_by_id(&self, id: i64) -> Result<Option<User>, StorageError>;

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StorageError>;

    /// Delete a user together with every asset they own.
    /// Returns false when no such user existed.
    async fn delete_user(&self, id: i64) -> Result<bool, StorageError>;

    /// Whether any asset currently holds `slug`
    async fn slug_exists(&self, slug: &str) -> Result<bool, StorageError>;

    /// Whether any asset currently holds `serial_number`
    async fn serial_number_exists(&self, serial_number: &str) -> Result<bool, StorageError>;

    /// Insert an asset under `slug` inside its own transaction.
    ///
    /// A slug or serial number taken at write time is reported as
    /// [`StorageError::UniqueViolation`] after the transaction is rolled back.
    async fn insert_asset(&self, asset: &NewAsset, slug: &str) -> Result<Asset, StorageError>;

    async fn asset_by_slug(&self, slug: &str) -> Result<Option<Asset>, StorageError>;

    /// All assets, newest first
    async fn list_assets(&self) -> Result<Vec<Asset>, StorageError>;
}
