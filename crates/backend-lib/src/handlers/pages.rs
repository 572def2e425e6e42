// ============================
// crates/backend-lib/src/handlers/pages.rs
// ============================
//! Public pages.
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{StatusCode, Uri},
    response::Response,
};
use tracing::debug;

use super::page;
use crate::auth::Jar;
use crate::error::AppError;
use crate::extract::{CurrentUser, Flashes};
use crate::storage::Storage;
use crate::views::{self, PageContext};
use crate::AppState;

/// `GET /`
pub async fn index<S: Storage + 'static>(
    State(state): State<Arc<AppState<S>>>,
    CurrentUser(user): CurrentUser,
    Flashes(flashes): Flashes,
    jar: Jar,
) -> Result<Response, AppError> {
    let assets = state.storage.list_assets().await?;
    let ctx = PageContext {
        user: user.as_ref(),
        flashes: &flashes,
    };
    Ok(page(jar, StatusCode::OK, views::index(&assets, ctx), !flashes.is_empty()))
}

/// `GET /asset/{slug}/`
pub async fn asset_detail<S: Storage + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(slug): Path<String>,
    CurrentUser(user): CurrentUser,
    Flashes(flashes): Flashes,
    jar: Jar,
) -> Result<Response, AppError> {
    let asset = state
        .storage
        .asset_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("asset {slug:?}")))?;
    let ctx = PageContext {
        user: user.as_ref(),
        flashes: &flashes,
    };
    Ok(page(jar, StatusCode::OK, views::asset_detail(&asset, ctx), !flashes.is_empty()))
}

/// Fallback for every unknown route
pub async fn not_found(uri: Uri) -> AppError {
    debug!(%uri, "no route");
    AppError::NotFound(uri.path().to_string())
}
