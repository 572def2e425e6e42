// ============================
// assetreg-backend-lib/src/auth/session.rs
// ============================
//! Stateless sessions.
//!
//! A session is a small JSON payload carried in a private cookie. Nothing
//! is stored server side: the jar key derived from the configured secret is
//! the only state, so a session reads back only on servers sharing that
//! secret.
use std::time::Duration;

use axum_extra::extract::cookie::{Cookie, PrivateCookieJar};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::cookie::{removal, site_cookie};
use crate::config::SessionSettings;

/// Session information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: i64,
    /// Unix seconds
    pub issued_at: i64,
    /// Unix seconds
    pub expires_at: i64,
    /// Issued through "remember me"
    pub remember: bool,
}

impl Session {
    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.expires_at
    }
}

/// Issues and reads session cookies
#[derive(Debug, Clone)]
pub struct SessionManager {
    cookie_name: String,
    ttl: Duration,
    remember_ttl: Duration,
    secure: bool,
}

impl SessionManager {
    pub fn new(cookie_name: impl Into<String>, ttl: Duration, remember_ttl: Duration) -> Self {
        Self {
            cookie_name: cookie_name.into(),
            ttl,
            remember_ttl,
            secure: false,
        }
    }

    /// Only send the cookie over HTTPS
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn from_settings(settings: &SessionSettings) -> Self {
        Self::new(
            settings.cookie_name.clone(),
            settings.ttl(),
            settings.remember_ttl(),
        )
        .secure(settings.secure)
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Lifetime of a session issued with the given remember flag
    pub fn ttl_for(&self, remember: bool) -> Duration {
        if remember {
            self.remember_ttl
        } else {
            self.ttl
        }
    }

    /// Session cookie for `user_id`.
    ///
    /// Remembered sessions carry `Max-Age` and survive a browser restart;
    /// the others end with the browser session.
    pub fn new_session(&self, user_id: i64, remember: bool) -> anyhow::Result<Cookie<'static>> {
        let ttl = self.ttl_for(remember);
        let now = Utc::now().timestamp();
        let session = Session {
            user_id,
            issued_at: now,
            expires_at: now.saturating_add(i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX)),
            remember,
        };
        let payload = serde_json::to_string(&session)?;
        Ok(site_cookie(
            self.cookie_name.clone(),
            payload,
            remember.then_some(ttl),
            self.secure,
        ))
    }

    /// The unexpired session carried by `jar`, if any
    pub fn get<K>(&self, jar: &PrivateCookieJar<K>) -> Option<Session> {
        let cookie = jar.get(&self.cookie_name)?;
        Self::decode(cookie.value())
    }

    /// Parse a decrypted cookie value, rejecting expired sessions
    pub fn decode(value: &str) -> Option<Session> {
        let session: Session = serde_json::from_str(value).ok()?;
        if session.is_expired_at(Utc::now().timestamp()) {
            return None;
        }
        Some(session)
    }

    /// Cookie that ends the session in the browser
    pub fn end_session(&self) -> Cookie<'static> {
        removal(self.cookie_name.clone())
    }
}
