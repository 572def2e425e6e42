// ==============
// crates/backend-lib/src/metrics.rs

//! Central place for metric keys
pub const ASSET_CREATED: &str = "asset.created";
pub const ASSET_SLUG_CONFLICT: &str = "asset.slug_conflict";
pub const USER_REGISTERED: &str = "user.registered";
pub const AUTH_LOGIN_SUCCEEDED: &str = "auth.login_succeeded";
pub const AUTH_LOGIN_FAILED: &str = "auth.login_failed";
pub const AUTH_LOCKED_OUT: &str = "auth.locked_out";
