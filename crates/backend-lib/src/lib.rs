// ============================
// assetreg-backend-lib/src/lib.rs
// ============================
//! Core backend-lib functionality for the asset registry web server.

pub mod accounts;
pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod flash;
pub mod forms;
pub mod handlers;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod router;
pub mod slug;
pub mod storage;
pub mod validation;
pub mod views;

use std::sync::Arc;

use crate::auth::{AuthRateLimiter, AuthService, CookieKey, DefaultAuth, SessionManager};
use crate::config::Settings;

/// Application state shared across all handlers
pub struct AppState<S> {
    /// Authentication service
    pub auth: Arc<dyn AuthService>,
    /// Settings manager
    pub settings: Arc<Settings>,
    /// Storage backend
    pub storage: S,
    /// Failed-login throttle
    pub login_limiter: AuthRateLimiter,
    /// Key of the private cookie jar
    pub cookie_key: CookieKey,
}

impl<S> AppState<S> {
    /// Create a new application state
    pub fn new(storage: S, settings: Settings) -> Self {
        let cookie_key = CookieKey::from_secret(settings.secret_key.expose());
        let sessions = SessionManager::from_settings(&settings.session);
        let auth = Arc::new(DefaultAuth::new(sessions, settings.password_hash));
        let login_limiter = AuthRateLimiter::from_settings(&settings.login_throttle);

        Self {
            auth,
            settings: Arc::new(settings),
            storage,
            login_limiter,
            cookie_key,
        }
    }
}
