// ============================
// assetreg-backend-lib/src/config.rs
// ============================
//! Configuration management.
use std::fmt;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Result};
use assetreg_common::AssetVariant;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::auth::PasswordRequirements;

/// Prefix for environment overrides, e.g. `ASSETREG_DATABASE__URL`
pub const ENV_PREFIX: &str = "ASSETREG_";

/// Config file read when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "assetreg.toml";

/// Key material shipped for local development only
pub const DEV_SECRET_KEY: &str = "assetreg-development-secret-change-me";

const MIN_SECRET_KEY_LENGTH: usize = 16;
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Session key material
    pub secret_key: SecretKey,
    /// Log level
    pub log_level: String,
    /// Log output format
    pub log_format: LogFormat,
    pub database: DatabaseSettings,
    pub session: SessionSettings,
    /// Password requirements
    pub password_requirements: PasswordRequirements,
    pub password_hash: PasswordHashSettings,
    pub assets: AssetSettings,
    pub login_throttle: LoginThrottleSettings,
}

/// Secret string that stays out of logs and is wiped on drop
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretKey(String);

impl SecretKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_development_default(&self) -> bool {
        self.0 == DEV_SECRET_KEY
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(***)")
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite URL, e.g. `sqlite://assetreg.db`
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    pub cookie_name: String,
    /// Lifetime of a plain login
    pub ttl_secs: u64,
    /// Lifetime of a "remember me" login
    pub remember_ttl_secs: u64,
    /// Mark cookies `Secure` (HTTPS only)
    pub secure: bool,
}

impl SessionSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn remember_ttl(&self) -> Duration {
        Duration::from_secs(self.remember_ttl_secs)
    }
}

/// scrypt cost parameters for new hashes
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PasswordHashSettings {
    pub log_n: u8,
    pub r: u32,
    pub p: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetSettings {
    /// Which attribute the creation form requires
    pub variant: AssetVariant,
    /// Write conflicts tolerated while claiming a slug
    pub slug_conflict_retries: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginThrottleSettings {
    pub max_attempts: u32,
    pub lockout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            secret_key: SecretKey::new(DEV_SECRET_KEY),
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            database: DatabaseSettings {
                url: "sqlite://assetreg.db".to_string(),
                max_connections: 5,
            },
            session: SessionSettings {
                cookie_name: "assetreg_session".to_string(),
                ttl_secs: 60 * 60 * 24,                 // 1 day
                remember_ttl_secs: 60 * 60 * 24 * 365, // 1 year
                secure: false,
            },
            password_requirements: PasswordRequirements::default(),
            password_hash: PasswordHashSettings { log_n: 15, r: 8, p: 1 },
            assets: AssetSettings {
                variant: AssetVariant::Serial,
                slug_conflict_retries: 100,
            },
            login_throttle: LoginThrottleSettings {
                max_attempts: 5,
                lockout_secs: 5 * 60,
            },
        }
    }
}

impl Settings {
    /// Load settings from defaults, an optional TOML file and the environment
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let settings: Settings = figment(config_file).extract()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            bail!("log_level must be one of {LOG_LEVELS:?}, got {:?}", self.log_level);
        }
        if self.secret_key.expose().len() < MIN_SECRET_KEY_LENGTH {
            bail!("secret_key must be at least {MIN_SECRET_KEY_LENGTH} bytes");
        }
        if self.database.url.trim().is_empty() {
            bail!("database.url must not be empty");
        }
        if self.database.max_connections == 0 {
            bail!("database.max_connections must be at least 1");
        }
        if self.session.ttl_secs == 0 || self.session.remember_ttl_secs == 0 {
            bail!("session TTLs must be greater than zero");
        }
        if self.session.cookie_name.is_empty()
            || !self
                .session
                .cookie_name
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
        {
            bail!("session.cookie_name must be a non-empty token");
        }
        if self.password_requirements.min_length < 4 {
            bail!("password_requirements.min_length must be at least 4");
        }
        if self.password_hash.log_n == 0 || self.password_hash.r == 0 || self.password_hash.p == 0 {
            bail!("password_hash parameters must be greater than zero");
        }
        if self.login_throttle.max_attempts == 0 {
            bail!("login_throttle.max_attempts must be at least 1");
        }
        Ok(())
    }
}

/// The layered provider behind [`Settings::load`]
pub fn figment(config_file: Option<&Path>) -> Figment {
    let config_file = config_file.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));

    Figment::from(Serialized::defaults(Settings::default()))
        .merge(Toml::file(config_file))
        .merge(
            Env::raw()
                .only(&["SECRET_KEY", "DATABASE_URL"])
                .map(|key| {
                    if key.as_str().eq_ignore_ascii_case("secret_key") {
                        "secret_key".into()
                    } else {
                        "database.url".into()
                    }
                }),
        )
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

#[cfg(test)]
mod config_tests;
