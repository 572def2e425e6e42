// ============================
// assetreg-backend-lib/src/auth/rate_limit.rs
// ============================
//! Rate limiting for login attempts.

use dashmap::DashMap;
use metrics::counter;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::LoginThrottleSettings;
use crate::metrics::AUTH_LOCKED_OUT;

/// Entry in the rate limit map
#[derive(Debug, Clone)]
struct RateLimitEntry {
    /// Number of failed attempts
    failed_attempts: u32,
    /// Time of the last failed attempt
    last_failure: Instant,
    /// When the lockout expires, if locked out
    lockout_expiry: Option<Instant>,
}

/// Rate limiter for login attempts, keyed by client address
#[derive(Debug, Clone)]
pub struct AuthRateLimiter {
    attempts: Arc<DashMap<String, RateLimitEntry>>,
    /// Maximum number of failed attempts before lockout
    max_attempts: u32,
    /// Duration of lockout period
    lockout_duration: Duration,
}

impl AuthRateLimiter {
    /// Create a new auth rate limiter
    pub fn new(max_attempts: u32, lockout_duration: Duration) -> Self {
        Self {
            attempts: Arc::new(DashMap::new()),
            max_attempts,
            lockout_duration,
        }
    }

    pub fn from_settings(settings: &LoginThrottleSettings) -> Self {
        Self::new(
            settings.max_attempts,
            Duration::from_secs(settings.lockout_secs),
        )
    }

    /// Record a failed login attempt
    pub fn record_failed_attempt(&self, key: &str) {
        let now = Instant::now();

        let mut entry = self
            .attempts
            .entry(key.to_string())
            .or_insert_with(|| RateLimitEntry {
                failed_attempts: 0,
                last_failure: now,
                lockout_expiry: None,
            });

        // Reset once an earlier lockout has run out
        if matches!(entry.lockout_expiry, Some(expiry) if now >= expiry) {
            entry.failed_attempts = 0;
            entry.lockout_expiry = None;
        }

        entry.failed_attempts += 1;
        entry.last_failure = now;

        if entry.failed_attempts >= self.max_attempts && entry.lockout_expiry.is_none() {
            entry.lockout_expiry = Some(now + self.lockout_duration);
            counter!(AUTH_LOCKED_OUT).increment(1);
            tracing::warn!(
                client = %key,
                attempts = entry.failed_attempts,
                lockout_secs = self.lockout_duration.as_secs(),
                "client locked out after repeated login failures"
            );
        }
    }

    /// Record a successful login
    pub fn record_success(&self, key: &str) {
        self.attempts.remove(key);
    }

    /// Check if a client is allowed to attempt a login
    pub fn check_rate_limit(&self, key: &str) -> bool {
        match self.attempts.get(key) {
            Some(entry) => match entry.lockout_expiry {
                Some(expiry) => Instant::now() >= expiry,
                None => true,
            },
            None => true,
        }
    }

    /// Clean up expired lockouts and stale entries
    pub fn cleanup(&self) {
        let now = Instant::now();

        self.attempts.retain(|_, entry| {
            if let Some(expiry) = entry.lockout_expiry {
                return now < expiry;
            }
            // Otherwise, keep entries for a day
            now.duration_since(entry.last_failure) < Duration::from_secs(24 * 60 * 60)
        });
        tracing::debug!(tracked = self.attempts.len(), "swept login throttle");
    }
}
