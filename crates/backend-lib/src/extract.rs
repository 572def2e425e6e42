// ============================
// assetreg-backend-lib/src/extract.rs
// ============================
//! Request extractors: signed-in user, client address, host and flashes.
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;
use url::form_urlencoded;

use crate::auth::Jar;
use crate::error::AppError;
use crate::flash::{self, Flash};
use crate::models::User;
use crate::storage::Storage;
use crate::AppState;

/// The request's decrypted cookies
async fn cookie_jar<S: Storage + 'static>(parts: &mut Parts, state: &Arc<AppState<S>>) -> Jar {
    match Jar::from_request_parts(parts, state).await {
        Ok(jar) => jar,
        Err(never) => match never {},
    }
}

/// The user bound to the request's session cookie, if any
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<User>);

impl<S> FromRequestParts<Arc<AppState<S>>> for CurrentUser
where
    S: Storage + 'static,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState<S>>,
    ) -> Result<Self, Self::Rejection> {
        let jar = cookie_jar(parts, state).await;
        let Some(session) = state.auth.get_session(&jar) else {
            return Ok(CurrentUser(None));
        };
        let user = state.storage.user_by_id(session.user_id).await?;
        if user.is_none() {
            debug!(user_id = session.user_id, "session refers to a deleted user");
        }
        Ok(CurrentUser(user))
    }
}

/// Gate for login-required routes.
///
/// Anonymous requests are sent to `/login?next=<path and query>`.
#[derive(Debug, Clone)]
pub struct RequireUser(pub User);

/// Where an anonymous request to `parts` is sent
pub fn login_redirect_target(parts: &Parts) -> String {
    let original = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let next: String = form_urlencoded::byte_serialize(original.as_bytes()).collect();
    format!("/login?next={next}")
}

impl<S> FromRequestParts<Arc<AppState<S>>> for RequireUser
where
    S: Storage + 'static,
{
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState<S>>,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;
        match user {
            Some(user) => Ok(RequireUser(user)),
            None => Err(Redirect::to(&login_redirect_target(parts)).into_response()),
        }
    }
}

/// Key used to throttle failed logins
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientAddr(pub String);

fn forwarded_for(headers: &HeaderMap) -> Option<String> {
    let real_ip = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    let forwarded = || {
        headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };
    real_ip.or_else(forwarded).map(str::to_string)
}

impl<S> FromRequestParts<S> for ClientAddr
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let addr = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .or_else(|| forwarded_for(&parts.headers))
            .unwrap_or_else(|| "unknown".to_string());
        Ok(ClientAddr(addr))
    }
}

/// Host the request was addressed to, used to judge redirect targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHost(pub String);

impl<S> FromRequestParts<S> for RequestHost
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let host = parts
            .headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .or_else(|| parts.uri.authority().map(|a| a.as_str().to_string()))
            .unwrap_or_default();
        Ok(RequestHost(host))
    }
}

/// Flash messages sent along with the request
#[derive(Debug, Clone, Default)]
pub struct Flashes(pub Vec<Flash>);

impl<S> FromRequestParts<Arc<AppState<S>>> for Flashes
where
    S: Storage + 'static,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState<S>>,
    ) -> Result<Self, Self::Rejection> {
        let jar = cookie_jar(parts, state).await;
        Ok(Flashes(flash::pending(&jar)))
    }
}
