// ============================
// assetreg-backend-lib/src/router.rs
// ============================
//! HTTP routes.
use crate::handlers::{assets, auth, pages};
use crate::storage::Storage;
use crate::AppState;
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Create the application router
pub fn create_router<S: Storage + 'static>(state: Arc<AppState<S>>) -> Router {
    Router::new()
        .route("/", get(pages::index::<S>))
        .route("/asset/{slug}/", get(pages::asset_detail::<S>))
        .route("/login", get(auth::login_page).post(auth::login_submit::<S>))
        .route("/signup", get(auth::signup_page).post(auth::signup_submit::<S>))
        .route("/signup/", get(auth::signup_page).post(auth::signup_submit::<S>))
        .route("/logout", get(auth::logout::<S>))
        .route(
            "/admin/asset/new",
            get(assets::new_asset_page::<S>).post(assets::new_asset_submit::<S>),
        )
        .route(
            "/admin/asset/register",
            get(assets::new_asset_page::<S>).post(assets::new_asset_submit::<S>),
        )
        .fallback(pages::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
