// ============================
// crates/backend-lib/src/handlers/assets.rs
// ============================
//! Asset registration for signed-in users.
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Response, Form};

use super::{page, redirect_with};
use crate::auth::Jar;
use crate::error::AppError;
use crate::extract::{Flashes, RequireUser};
use crate::flash::Flash;
use crate::forms::{AssetForm, FormErrors};
use crate::models::User;
use crate::slug::create_asset;
use crate::storage::Storage;
use crate::views::{self, PageContext};
use crate::AppState;

fn render_form<S>(
    jar: Jar,
    state: &AppState<S>,
    user: &User,
    form: &AssetForm,
    errors: &FormErrors,
    flashes: &[Flash],
) -> Response {
    let ctx = PageContext {
        user: Some(user),
        flashes,
    };
    let html = views::asset_form(form, errors, state.settings.assets.variant, ctx);
    page(jar, StatusCode::OK, html, !flashes.is_empty())
}

/// `GET /admin/asset/new`
pub async fn new_asset_page<S: Storage + 'static>(
    State(state): State<Arc<AppState<S>>>,
    RequireUser(user): RequireUser,
    Flashes(flashes): Flashes,
    jar: Jar,
) -> Response {
    render_form(
        jar,
        &state,
        &user,
        &AssetForm::default(),
        &FormErrors::default(),
        &flashes,
    )
}

/// `POST /admin/asset/new`
pub async fn new_asset_submit<S: Storage + 'static>(
    State(state): State<Arc<AppState<S>>>,
    RequireUser(user): RequireUser,
    jar: Jar,
    Form(form): Form<AssetForm>,
) -> Result<Response, AppError> {
    let settings = &state.settings.assets;

    let new_asset = match form.validate(settings.variant, user.id) {
        Ok(new_asset) => new_asset,
        Err(errors) => return Ok(render_form(jar, &state, &user, &form, &errors, &[])),
    };

    match create_asset(&state.storage, &new_asset, settings.slug_conflict_retries).await {
        Ok(asset) => {
            let saved = Flash::success(format!("Asset \"{}\" has been registered.", asset.name));
            Ok(redirect_with(
                jar,
                &asset.public_url(),
                &[saved],
                state.settings.session.secure,
            ))
        },
        Err(err @ AppError::DuplicateSerial(_)) => {
            let mut errors = FormErrors::default();
            errors.field_message("serial_number", err.sanitized_message());
            Ok(render_form(jar, &state, &user, &form, &errors, &[]))
        },
        Err(err) => Err(err),
    }
}
