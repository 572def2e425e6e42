// ============================
// assetreg-backend-lib/src/slug.rs
// ============================
//! Claiming a unique slug for a new asset.
//!
//! Probing for a free candidate happens outside any transaction. Another
//! writer may claim the same candidate between the lookup and the insert,
//! so the unique index is the arbiter: a rejected insert is rolled back
//! and the search starts over from the base slug.
use assetreg_common::{candidate, slugify};
use metrics::counter;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::metrics::{ASSET_CREATED, ASSET_SLUG_CONFLICT};
use crate::models::{Asset, NewAsset};
use crate::storage::{Storage, StorageError};

/// First free candidate for `base`, probing `base`, `base-1`, `base-2`, ...
pub async fn first_free_slug<S>(storage: &S, base: &str) -> Result<String, StorageError>
where
    S: Storage + ?Sized,
{
    let mut attempt = 0u32;
    loop {
        let slug = candidate(base, attempt);
        if !storage.slug_exists(&slug).await? {
            debug!(%slug, attempt, "found free slug");
            return Ok(slug);
        }
        attempt += 1;
    }
}

/// Save `asset` under a slug derived from its name.
///
/// `max_conflicts` bounds how many write-time slug collisions are retried
/// before giving up with [`AppError::SlugConflict`]. A taken serial number
/// is reported as [`AppError::DuplicateSerial`] without retrying.
pub async fn create_asset<S>(
    storage: &S,
    asset: &NewAsset,
    max_conflicts: u32,
) -> Result<Asset, AppError>
where
    S: Storage + ?Sized,
{
    if let Some(serial) = asset.serial_number.as_deref() {
        if storage.serial_number_exists(serial).await? {
            return Err(AppError::DuplicateSerial(serial.to_string()));
        }
    }

    let base = slugify(&asset.name);
    let mut conflicts = 0u32;

    loop {
        let slug = first_free_slug(storage, &base).await?;

        match storage.insert_asset(asset, &slug).await {
            Ok(saved) => {
                counter!(ASSET_CREATED).increment(1);
                info!(asset_id = saved.id, slug = %saved.slug, owner = saved.user_id, "asset created");
                return Ok(saved);
            },
            Err(err) if err.is_unique_violation() => {
                if storage.slug_exists(&slug).await? {
                    conflicts += 1;
                    counter!(ASSET_SLUG_CONFLICT).increment(1);
                    warn!(%slug, conflicts, "slug claimed by a concurrent writer, retrying");
                    if conflicts > max_conflicts {
                        return Err(AppError::SlugConflict {
                            base,
                            attempts: conflicts,
                        });
                    }
                    continue;
                }
                if let Some(serial) = asset.serial_number.as_deref() {
                    if storage.serial_number_exists(serial).await? {
                        return Err(AppError::DuplicateSerial(serial.to_string()));
                    }
                }
                return Err(err.into());
            },
            Err(err) => return Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::models::{NewUser, User};
    use crate::storage::SqliteStorage;

    /// Storage that lets a competitor claim the chosen slug right before
    /// the first `times` inserts
    struct RacingStorage {
        inner: SqliteStorage,
        owner: i64,
        remaining: AtomicU32,
        raced: AtomicBool,
    }

    impl RacingStorage {
        fn new(inner: SqliteStorage, owner: i64, times: u32) -> Self {
            Self {
                inner,
                owner,
                remaining: AtomicU32::new(times),
                raced: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl Storage for RacingStorage {
        async fn migrate(&self) -> Result<(), StorageError> {
            self.inner.migrate().await
        }

        async fn create_user(&self, user: &NewUser) -> Result<User, StorageError> {
            self.inner.create_user(user).await
        }

        async fn user_by_id(&self, id: i64) -> Result<Option<User>, StorageError> {
            self.inner.user_by_id(id).await
        }

        async fn user_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
            self.inner.user_by_email(email).await
        }

        async fn delete_user(&self, id: i64) -> Result<bool, StorageError> {
            self.inner.delete_user(id).await
        }

        async fn slug_exists(&self, slug: &str) -> Result<bool, StorageError> {
            self.inner.slug_exists(slug).await
        }

        async fn serial_number_exists(&self, serial_number: &str) -> Result<bool, StorageError> {
            self.inner.serial_number_exists(serial_number).await
        }

        async fn insert_asset(&self, asset: &NewAsset, slug: &str) -> Result<Asset, StorageError> {
            let left = self.remaining.load(Ordering::SeqCst);
            if left > 0 {
                self.remaining.store(left - 1, Ordering::SeqCst);
                self.raced.store(true, Ordering::SeqCst);
                let competitor = NewAsset {
                    user_id: self.owner,
                    name: asset.name.clone(),
                    description: "Inserted by a concurrent request".to_string(),
                    serial_number: None,
                    value_cents: None,
                };
                self.inner.insert_asset(&competitor, slug).await?;
            }
            self.inner.insert_asset(asset, slug).await
        }

        async fn asset_by_slug(&self, slug: &str) -> Result<Option<Asset>, StorageError> {
            self.inner.asset_by_slug(slug).await
        }

        async fn list_assets(&self) -> Result<Vec<Asset>, StorageError> {
            self.inner.list_assets().await
        }
    }

    async fn storage_with_owner() -> (SqliteStorage, i64) {
        let storage = SqliteStorage::in_memory().await.unwrap();
        storage.migrate().await.unwrap();
        let owner = storage
            .create_user(&NewUser {
                username: "owner".to_string(),
                email: "owner@example.com".to_string(),
                password_hash: "$scrypt$placeholder".to_string(),
            })
            .await
            .unwrap();
        (storage, owner.id)
    }

    fn new_asset(owner: i64, name: &str, serial: Option<&str>) -> NewAsset {
        NewAsset {
            user_id: owner,
            name: name.to_string(),
            description: "Something worth tracking".to_string(),
            serial_number: serial.map(str::to_string),
            value_cents: None,
        }
    }

    #[tokio::test]
    async fn test_same_name_gets_suffixes() {
        let (storage, owner) = storage_with_owner().await;

        let mut slugs = Vec::new();
        for _ in 0..3 {
            let asset = create_asset(&storage, &new_asset(owner, "Pallet Jack!", None), 10)
                .await
                .unwrap();
            slugs.push(asset.slug);
        }

        assert_eq!(slugs, ["pallet-jack", "pallet-jack-1", "pallet-jack-2"]);
    }

    #[tokio::test]
    async fn test_gap_in_sequence_is_reused() {
        let (storage, owner) = storage_with_owner().await;
        storage
            .insert_asset(&new_asset(owner, "Crane", None), "crane-1")
            .await
            .unwrap();

        let asset = create_asset(&storage, &new_asset(owner, "Crane", None), 10)
            .await
            .unwrap();
        assert_eq!(asset.slug, "crane");

        let asset = create_asset(&storage, &new_asset(owner, "Crane", None), 10)
            .await
            .unwrap();
        assert_eq!(asset.slug, "crane-2");
    }

    #[tokio::test]
    async fn test_unusable_name_falls_back() {
        let (storage, owner) = storage_with_owner().await;
        let asset = create_asset(&storage, &new_asset(owner, "!!!!!", None), 10)
            .await
            .unwrap();
        assert_eq!(asset.slug, "asset");
    }

    #[tokio::test]
    async fn test_write_time_race_is_retried() {
        let (inner, owner) = storage_with_owner().await;
        let storage = RacingStorage::new(inner, owner, 1);

        let asset = create_asset(&storage, &new_asset(owner, "Forklift", Some("FL-1")), 10)
            .await
            .unwrap();

        assert!(storage.raced.load(Ordering::SeqCst));
        assert_eq!(asset.slug, "forklift-1");
        assert_eq!(
            storage.inner.asset_by_slug("forklift").await.unwrap().map(|a| a.description),
            Some("Inserted by a concurrent request".to_string())
        );
        assert_eq!(storage.list_assets().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let (inner, owner) = storage_with_owner().await;
        let storage = RacingStorage::new(inner, owner, 5);

        let err = create_asset(&storage, &new_asset(owner, "Forklift", None), 2)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::SlugConflict { ref base, attempts: 3 } if base == "forklift"
        ));
    }

    #[tokio::test]
    async fn test_duplicate_serial_is_not_retried() {
        let (storage, owner) = storage_with_owner().await;
        create_asset(&storage, &new_asset(owner, "Drill press", Some("DP-9")), 10)
            .await
            .unwrap();

        let err = create_asset(&storage, &new_asset(owner, "Another drill", Some("DP-9")), 10)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateSerial(ref s) if s == "DP-9"));
        assert_eq!(storage.list_assets().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_owner_surfaces_storage_error() {
        let (storage, _) = storage_with_owner().await;
        let err = create_asset(&storage, &new_asset(999, "Ghost asset", None), 10)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Storage(StorageError::Database(_))));
    }
}
