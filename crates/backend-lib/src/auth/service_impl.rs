use async_trait::async_trait;
use axum_extra::extract::cookie::Cookie;
use tokio::sync::OnceCell;
use zeroize::Zeroize;

use crate::auth::cookie::Jar;
use crate::auth::{
    hash_password, hash_password_secure, verify_password, AuthService, Session, SessionManager,
};
use crate::config::PasswordHashSettings;

const DECOY_PASSWORD: &str = "decoy-password-nobody-has";

pub struct DefaultAuth {
    sm: SessionManager,
    cost: PasswordHashSettings,
    decoy: OnceCell<String>,
}

impl DefaultAuth {
    pub fn new(sm: SessionManager, cost: PasswordHashSettings) -> Self {
        Self {
            sm,
            cost,
            decoy: OnceCell::new(),
        }
    }
}

#[async_trait]
impl AuthService for DefaultAuth {
    async fn hash_password(&self, mut plain: String) -> anyhow::Result<String> {
        let cost = self.cost;
        // scrypt is CPU bound, keep it off the async workers
        tokio::task::spawn_blocking(move || hash_password_secure(&mut plain, &cost)).await?
    }

    async fn verify_password(&self, hash: String, mut plain: String) -> bool {
        let verified = tokio::task::spawn_blocking(move || {
            let ok = verify_password(&hash, &plain);
            plain.zeroize();
            ok
        })
        .await;

        match verified {
            Ok(ok) => ok,
            Err(e) => {
                tracing::error!(error = %e, "password verification task failed");
                false
            }
        }
    }

    async fn decoy_hash(&self) -> anyhow::Result<String> {
        let cost = self.cost;
        let hash = self
            .decoy
            .get_or_try_init(|| async move {
                match tokio::task::spawn_blocking(move || hash_password(DECOY_PASSWORD, &cost)).await {
                    Ok(hashed) => hashed,
                    Err(e) => Err(anyhow::Error::from(e)),
                }
            })
            .await?;
        Ok(hash.clone())
    }

    fn new_session(&self, user_id: i64, remember: bool) -> anyhow::Result<Cookie<'static>> {
        self.sm.new_session(user_id, remember)
    }

    fn get_session(&self, jar: &Jar) -> Option<Session> {
        self.sm.get(jar)
    }

    fn end_session(&self) -> Cookie<'static> {
        self.sm.end_session()
    }
}
