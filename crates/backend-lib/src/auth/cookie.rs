// ============================
// assetreg-backend-lib/src/auth/cookie.rs
// ============================
//! Private cookie jar shared by sessions and flash messages.
//!
//! Cookies in the jar are encrypted and authenticated (AES-256-GCM) under a
//! key derived from the configured secret. A cookie that was forged,
//! tampered with or sealed under another secret is dropped when the request
//! jar is built, so handlers only ever see values this server wrote.
use std::sync::Arc;
use std::time::Duration;

use axum::extract::FromRef;
use axum_extra::extract::cookie::{Cookie, Key, PrivateCookieJar, SameSite};
use sha2::{Digest, Sha512};

use crate::AppState;

/// Encryption key of the private cookie jar
#[derive(Clone)]
pub struct CookieKey(Key);

impl CookieKey {
    pub fn from_secret(secret: &str) -> Self {
        // The jar wants 64 bytes of key material
        let material = Sha512::digest(secret.as_bytes());
        Self(Key::from(material.as_slice()))
    }
}

impl From<CookieKey> for Key {
    fn from(key: CookieKey) -> Self {
        key.0
    }
}

impl<S> FromRef<Arc<AppState<S>>> for CookieKey {
    fn from_ref(state: &Arc<AppState<S>>) -> Self {
        state.cookie_key.clone()
    }
}

/// Decrypted request cookies; changes become `Set-Cookie` headers
pub type Jar = PrivateCookieJar<CookieKey>;

/// HttpOnly, `SameSite=Lax` cookie valid for the whole site.
///
/// Without `max_age` it lasts until the browser closes.
pub fn site_cookie(
    name: impl Into<String>,
    value: impl Into<String>,
    max_age: Option<Duration>,
    secure: bool,
) -> Cookie<'static> {
    let mut cookie = Cookie::build((name.into(), value.into()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build();
    cookie.set_max_age(max_age.map(to_time));
    cookie
}

/// Matches a [`site_cookie`] so the jar can expire it
pub fn removal(name: impl Into<String>) -> Cookie<'static> {
    Cookie::build((name.into(), "")).path("/").build()
}

fn to_time(duration: Duration) -> time::Duration {
    time::Duration::seconds(i64::try_from(duration.as_secs()).unwrap_or(i64::MAX))
}
