//! Test utilities for the HTTP flow tests
//!
//! Builds an application over a fresh SQLite database and wraps the
//! request plumbing the tests share.
#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, Response, StatusCode},
    Router,
};
use backend_lib::{
    config::{PasswordHashSettings, SecretKey, Settings},
    router::create_router,
    storage::{SqliteStorage, Storage},
    AppState,
};
use tempfile::TempDir;
use tower::ServiceExt;

pub const HOST: &str = "localhost";
pub const PASSWORD: &str = "hunter22";

/// Settings with a cheap password hash so tests stay fast
pub fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.secret_key = SecretKey::new("integration-test-secret-key");
    settings.password_hash = PasswordHashSettings { log_n: 4, r: 8, p: 1 };
    settings
}

pub struct TestApp {
    pub state: Arc<AppState<SqliteStorage>>,
    pub router: Router,
    /// Keeps an on-disk database alive for the test's duration
    _dir: Option<TempDir>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_settings(test_settings()).await
    }

    pub async fn with_settings(settings: Settings) -> Self {
        let storage = SqliteStorage::in_memory().await.unwrap();
        storage.migrate().await.unwrap();
        Self::build(storage, settings, None)
    }

    /// A file-backed database whose pool holds several connections
    pub async fn on_disk() -> Self {
        let dir = TempDir::new().unwrap();
        let url = format!("sqlite://{}", dir.path().join("assetreg.db").display());
        let storage = SqliteStorage::connect(&url, 8).await.unwrap();
        storage.migrate().await.unwrap();
        Self::build(storage, test_settings(), Some(dir))
    }

    fn build(storage: SqliteStorage, settings: Settings, dir: Option<TempDir>) -> Self {
        let state = Arc::new(AppState::new(storage, settings));
        let router = create_router(state.clone());
        Self {
            state,
            router,
            _dir: dir,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        self.send(request("GET", uri, cookie, Body::empty())).await
    }

    pub async fn post_form(&self, uri: &str, body: &str, cookie: Option<&str>) -> Response<Body> {
        self.send(request("POST", uri, cookie, Body::from(body.to_string())))
            .await
    }

    /// Sign up `email` and return the session cookie pair
    pub async fn signup(&self, username: &str, email: &str) -> String {
        let body = format!(
            "username={username}&email={}&password={PASSWORD}&password2={PASSWORD}",
            email.replace('@', "%40")
        );
        let response = self.post_form("/signup", &body, None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        session_cookie(&response, &self.state.settings.session.cookie_name)
            .expect("signup sets a session cookie")
    }
}

pub fn request(method: &str, uri: &str, cookie: Option<&str>, body: Body) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::HOST, HOST);
    if method == "POST" {
        builder = builder.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    }
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(body).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn location(response: &Response<Body>) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

/// Full `Set-Cookie` line for `name`
pub fn set_cookie_line<'a>(response: &'a Response<Body>, name: &str) -> Option<&'a str> {
    let prefix = format!("{name}=");
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|line| line.starts_with(&prefix))
}

/// `name=value` pair ready for a `Cookie` header
pub fn session_cookie(response: &Response<Body>, name: &str) -> Option<String> {
    set_cookie_line(response, name)
        .and_then(|line| line.split(';').next())
        .filter(|pair| pair.len() > name.len() + 1)
        .map(str::to_string)
}
