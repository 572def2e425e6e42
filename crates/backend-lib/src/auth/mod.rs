// ============================
// assetreg-backend-lib/src/auth/mod.rs
// ============================
//! Authentication module.

pub mod cookie;
pub mod password;
pub mod rate_limit;
pub mod session;
mod service;
mod service_impl;

pub use password::{
    hash_password, hash_password_secure, validate_password_strength, verify_password,
    PasswordRequirements, MIN_PASSWORD_LENGTH,
};
pub use cookie::{CookieKey, Jar};
pub use rate_limit::AuthRateLimiter;
pub use service::AuthService;
pub use service_impl::DefaultAuth;
pub use session::{Session, SessionManager};
