use async_trait::async_trait;
use axum_extra::extract::cookie::Cookie;

use super::cookie::Jar;
use super::Session;

#[async_trait]
pub trait AuthService: Send + Sync {
    async fn hash_password(&self, plain: String) -> anyhow::Result<String>;
    async fn verify_password(&self, hash: String, plain: String) -> bool;
    /// Hash at the configured cost that no user owns, for logins naming an unknown email
    async fn decoy_hash(&self) -> anyhow::Result<String>;
    fn new_session(&self, user_id: i64, remember: bool) -> anyhow::Result<Cookie<'static>>;
    fn get_session(&self, jar: &Jar) -> Option<Session>;
    fn end_session(&self) -> Cookie<'static>;
}
