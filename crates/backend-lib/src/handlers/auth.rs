// ============================
// crates/backend-lib/src/handlers/auth.rs
// ============================
//! Login, signup and logout.
use std::sync::Arc;

use assetreg_common::is_safe_url;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use metrics::counter;
use serde::Deserialize;
use tracing::{info, warn};

use super::{page, redirect_with};
use crate::accounts::{authenticate, register_user};
use crate::auth::Jar;
use crate::error::AppError;
use crate::extract::{ClientAddr, CurrentUser, Flashes, RequestHost};
use crate::flash::Flash;
use crate::forms::{FormErrors, LoginForm, SignupForm};
use crate::metrics::{AUTH_LOGIN_FAILED, AUTH_LOGIN_SUCCEEDED};
use crate::models::User;
use crate::storage::Storage;
use crate::views::{self, PageContext};
use crate::AppState;

/// `?next=` on the login page
#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

impl NextQuery {
    fn target(&self) -> Option<&str> {
        self.next.as_deref().filter(|next| !next.is_empty())
    }
}

/// Redirect target after login: `next` when it stays on this site, else `/`
pub fn post_login_target<'a>(host: &str, next: Option<&'a str>) -> &'a str {
    match next {
        Some(next) if is_safe_url(host, next) => next,
        Some(next) => {
            warn!(host, next, "ignoring unsafe redirect target");
            "/"
        },
        None => "/",
    }
}

/// Add a fresh session cookie for `user`
fn start_session<S>(
    state: &AppState<S>,
    jar: Jar,
    user: &User,
    remember: bool,
) -> Result<Jar, AppError> {
    let cookie = state
        .auth
        .new_session(user.id, remember)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(jar.add(cookie))
}

fn render_login(
    jar: Jar,
    form: &LoginForm,
    errors: &FormErrors,
    next: Option<&str>,
    flashes: &[Flash],
    status: StatusCode,
) -> Response {
    let ctx = PageContext { user: None, flashes };
    page(jar, status, views::login_form(form, errors, next, ctx), !flashes.is_empty())
}

/// `GET /login`
pub async fn login_page(
    CurrentUser(user): CurrentUser,
    Query(query): Query<NextQuery>,
    Flashes(flashes): Flashes,
    jar: Jar,
) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }
    render_login(
        jar,
        &LoginForm::default(),
        &FormErrors::default(),
        query.target(),
        &flashes,
        StatusCode::OK,
    )
}

/// `POST /login`
pub async fn login_submit<S: Storage + 'static>(
    State(state): State<Arc<AppState<S>>>,
    CurrentUser(current): CurrentUser,
    ClientAddr(client): ClientAddr,
    RequestHost(host): RequestHost,
    Query(query): Query<NextQuery>,
    jar: Jar,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    if current.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    let next = query.target();

    if !state.login_limiter.check_rate_limit(&client) {
        counter!(AUTH_LOGIN_FAILED).increment(1);
        let errors = FormErrors::message(AppError::AuthRateLimited.sanitized_message());
        return Ok(render_login(jar, &form, &errors, next, &[], StatusCode::TOO_MANY_REQUESTS));
    }

    let email = match form.validate() {
        Ok(email) => email,
        Err(errors) => return Ok(render_login(jar, &form, &errors, next, &[], StatusCode::OK)),
    };

    let user = match authenticate(&state.storage, state.auth.as_ref(), &email, form.password.clone()).await {
        Ok(user) => user,
        Err(err @ AppError::InvalidCredentials) => {
            state.login_limiter.record_failed_attempt(&client);
            counter!(AUTH_LOGIN_FAILED).increment(1);
            let errors = FormErrors::message(err.sanitized_message());
            return Ok(render_login(jar, &form, &errors, next, &[], StatusCode::OK));
        },
        Err(err) => return Err(err),
    };

    state.login_limiter.record_success(&client);
    counter!(AUTH_LOGIN_SUCCEEDED).increment(1);
    info!(user_id = user.id, remember = form.remember(), "user logged in");

    let jar = start_session(&state, jar, &user, form.remember())?;
    Ok((jar, Redirect::to(post_login_target(&host, next))).into_response())
}

fn render_signup(jar: Jar, form: &SignupForm, errors: &FormErrors, flashes: &[Flash]) -> Response {
    let ctx = PageContext { user: None, flashes };
    // Never echo passwords back
    let form = SignupForm {
        password: String::new(),
        password2: None,
        ..form.clone()
    };
    page(jar, StatusCode::OK, views::signup_form(&form, errors, ctx), !flashes.is_empty())
}

/// `GET /signup`
pub async fn signup_page(
    CurrentUser(user): CurrentUser,
    Flashes(flashes): Flashes,
    jar: Jar,
) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }
    render_signup(jar, &SignupForm::default(), &FormErrors::default(), &flashes)
}

/// `POST /signup`
pub async fn signup_submit<S: Storage + 'static>(
    State(state): State<Arc<AppState<S>>>,
    CurrentUser(current): CurrentUser,
    jar: Jar,
    Form(form): Form<SignupForm>,
) -> Result<Response, AppError> {
    if current.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let signup = match form.validate(&state.settings.password_requirements) {
        Ok(signup) => signup,
        Err(errors) => return Ok(render_signup(jar, &form, &errors, &[])),
    };

    let user = match register_user(&state.storage, state.auth.as_ref(), signup).await {
        Ok(user) => user,
        Err(err @ AppError::DuplicateEmail(_)) => {
            let mut errors = FormErrors::default();
            errors.field_message("email", err.sanitized_message());
            return Ok(render_signup(jar, &form, &errors, &[]));
        },
        Err(err) => return Err(err),
    };

    let welcome = Flash::success(format!("Welcome, {}! Your account has been created.", user.username));
    let jar = start_session(&state, jar, &user, false)?;
    Ok(redirect_with(jar, "/", &[welcome], state.settings.session.secure))
}

/// `GET /logout`
pub async fn logout<S: Storage + 'static>(
    State(state): State<Arc<AppState<S>>>,
    jar: Jar,
) -> Response {
    let jar = jar.remove(state.auth.end_session());
    redirect_with(
        jar,
        "/",
        &[Flash::info("You have been logged out.")],
        state.settings.session.secure,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_login_target() {
        assert_eq!(post_login_target("localhost", Some("/admin/asset/new")), "/admin/asset/new");
        assert_eq!(post_login_target("localhost", Some("http://localhost/x")), "http://localhost/x");
        assert_eq!(post_login_target("localhost", Some("http://evil.com/")), "/");
        assert_eq!(post_login_target("localhost", Some("//evil.com")), "/");
        assert_eq!(post_login_target("localhost", None), "/");
    }

    #[test]
    fn test_empty_next_is_ignored() {
        let query = NextQuery {
            next: Some(String::new()),
        };
        assert_eq!(query.target(), None);
    }
}
