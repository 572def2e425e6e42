//! SQLite implementation of the [`Storage`] trait.
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use super::{schema::SQLITE_INIT, Storage, StorageError};
use crate::models::{Asset, NewAsset, NewUser, User};

const USER_COLUMNS: &str = "id, username, email, password_hash";
const ASSET_COLUMNS: &str =
    "id, user_id, name, description, serial_number, value_cents, slug, created_at";

/// Pooled SQLite storage
#[derive(Clone, Debug)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Open (or create) the database at `url`, e.g. `sqlite://assetreg.db`.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        info!(url = %redact_url(url), max_connections, "connected to SQLite database");
        Ok(Self { pool })
    }

    /// A private in-memory database.
    ///
    /// Every SQLite connection to `:memory:` opens a fresh database, so the
    /// pool is pinned to one connection that is never recycled.
    pub async fn in_memory() -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }
}

/// `url` with any credentials stripped, for logs
fn redact_url(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(mut parsed) => {
            // Both fail only for URLs that cannot carry credentials
            let _ = parsed.set_username("");
            let _ = parsed.set_password(None);
            parsed.to_string()
        },
        Err(_) => "<unparseable database url>".to_string(),
    }
}

fn map_write_error(err: sqlx::Error) -> StorageError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StorageError::UniqueViolation(db.message().to_string())
        },
        _ => StorageError::Database(err),
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn migrate(&self) -> Result<(), StorageError> {
        for statement in SQLITE_INIT {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        debug!("schema is up to date");
        Ok(())
    }

    async fn create_user(&self, user: &NewUser) -> Result<User, StorageError> {
        let sql = format!(
            r#"INSERT INTO "user" (username, email, password_hash) VALUES (?, ?, ?) RETURNING {USER_COLUMNS}"#
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)
    }

    async fn user_by_id(&self, id: i64) -> Result<Option<User>, StorageError> {
        let sql = format!(r#"SELECT {USER_COLUMNS} FROM "user" WHERE id = ?"#);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        let sql = format!(r#"SELECT {USER_COLUMNS} FROM "user" WHERE email = ?"#);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn delete_user(&self, id: i64) -> Result<bool, StorageError> {
        let result = sqlx::query(r#"DELETE FROM "user" WHERE id = ?"#)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, StorageError> {
        let exists: i64 = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM asset WHERE slug = ?)")
            .bind(slug)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists != 0)
    }

    async fn serial_number_exists(&self, serial_number: &str) -> Result<bool, StorageError> {
        let exists: i64 =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM asset WHERE serial_number = ?)")
                .bind(serial_number)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists != 0)
    }

    async fn insert_asset(&self, asset: &NewAsset, slug: &str) -> Result<Asset, StorageError> {
        let sql = format!(
            "INSERT INTO asset (user_id, name, description, serial_number, value_cents, slug, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING {ASSET_COLUMNS}"
        );

        let mut tx = self.pool.begin().await?;
        let inserted = sqlx::query_as::<_, Asset>(&sql)
            .bind(asset.user_id)
            .bind(&asset.name)
            .bind(&asset.description)
            .bind(asset.serial_number.as_deref())
            .bind(asset.value_cents)
            .bind(slug)
            .bind(Utc::now())
            .fetch_one(&mut *tx)
            .await;

        match inserted {
            Ok(row) => {
                tx.commit().await?;
                Ok(row)
            },
            Err(err) => {
                tx.rollback().await?;
                Err(map_write_error(err))
            },
        }
    }

    async fn asset_by_slug(&self, slug: &str) -> Result<Option<Asset>, StorageError> {
        let sql = format!("SELECT {ASSET_COLUMNS} FROM asset WHERE slug = ?");
        let asset = sqlx::query_as::<_, Asset>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(asset)
    }

    async fn list_assets(&self) -> Result<Vec<Asset>, StorageError> {
        let sql = format!("SELECT {ASSET_COLUMNS} FROM asset ORDER BY created_at DESC, id DESC");
        let assets = sqlx::query_as::<_, Asset>(&sql).fetch_all(&self.pool).await?;
        Ok(assets)
    }
}
