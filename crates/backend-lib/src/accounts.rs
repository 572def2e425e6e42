// ============================
// assetreg-backend-lib/src/accounts.rs
// ============================
//! Registering and authenticating users.
use metrics::counter;
use tracing::{debug, info};

use crate::auth::AuthService;
use crate::error::AppError;
use crate::forms::ValidSignup;
use crate::metrics::USER_REGISTERED;
use crate::models::{NewUser, User};
use crate::storage::{Storage, StorageError};

/// Create an account from a validated signup.
///
/// A taken email yields [`AppError::DuplicateEmail`] and leaves the user
/// table untouched, including when the email is claimed between the
/// lookup and the insert.
pub async fn register_user<S>(
    storage: &S,
    auth: &dyn AuthService,
    signup: ValidSignup,
) -> Result<User, AppError>
where
    S: Storage + ?Sized,
{
    if storage.user_by_email(&signup.email).await?.is_some() {
        return Err(AppError::DuplicateEmail(signup.email));
    }

    let password_hash = auth
        .hash_password(signup.password)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let new_user = NewUser {
        username: signup.username,
        email: signup.email,
        password_hash,
    };
    let user = match storage.create_user(&new_user).await {
        Ok(user) => user,
        Err(StorageError::UniqueViolation(_)) => {
            return Err(AppError::DuplicateEmail(new_user.email));
        },
        Err(err) => return Err(err.into()),
    };

    counter!(USER_REGISTERED).increment(1);
    info!(user_id = user.id, username = %user.username, "user registered");
    Ok(user)
}

/// Check an email/password pair.
///
/// Unknown emails and wrong passwords both yield
/// [`AppError::InvalidCredentials`]. An unknown email is still checked
/// against a decoy hash so both failures cost one password verification.
pub async fn authenticate<S>(
    storage: &S,
    auth: &dyn AuthService,
    email: &str,
    password: String,
) -> Result<User, AppError>
where
    S: Storage + ?Sized,
{
    let user = storage.user_by_email(email).await?;
    let hash = match &user {
        Some(user) => user.password_hash.clone(),
        None => auth
            .decoy_hash()
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?,
    };
    let verified = auth.verify_password(hash, password).await;

    match user {
        Some(user) if verified => Ok(user),
        Some(user) => {
            debug!(user_id = user.id, "login with wrong password");
            Err(AppError::InvalidCredentials)
        },
        None => {
            debug!("login for unknown email");
            Err(AppError::InvalidCredentials)
        },
    }
}
