// ============================
// assetreg-backend-lib/src/flash.rs
// ============================
//! One-shot messages carried to the next page in a private cookie.
use axum_extra::extract::cookie::PrivateCookieJar;
use serde::{Deserialize, Serialize};

use crate::auth::cookie::{removal, site_cookie};

pub const FLASH_COOKIE: &str = "assetreg_flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Info,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Success => "success",
            Level::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: Level,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: Level::Info,
            message: message.into(),
        }
    }
}

/// Messages waiting in the request's flash cookie
pub fn pending<K>(jar: &PrivateCookieJar<K>) -> Vec<Flash> {
    jar.get(FLASH_COOKIE)
        .and_then(|cookie| serde_json::from_str(cookie.value()).ok())
        .unwrap_or_default()
}

/// Queue `messages` for the next page
pub fn push<K>(jar: PrivateCookieJar<K>, messages: &[Flash], secure: bool) -> PrivateCookieJar<K> {
    match serde_json::to_string(messages) {
        Ok(json) => jar.add(site_cookie(FLASH_COOKIE, json, None, secure)),
        Err(e) => {
            tracing::warn!(error = %e, "dropping flash messages");
            jar
        },
    }
}

/// Drop messages that have been rendered
pub fn clear<K>(jar: PrivateCookieJar<K>) -> PrivateCookieJar<K> {
    jar.remove(removal(FLASH_COOKIE))
}
