// ============================
// crates/backend-lib/src/handlers/mod.rs
// ============================
//! HTTP handlers and the response helpers they share.
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};

use crate::auth::Jar;
use crate::flash::{self, Flash};

pub mod assets;
pub mod auth;
pub mod pages;

/// Render `html`, consuming any flash messages it displayed
pub(crate) fn page(jar: Jar, status: StatusCode, html: String, shown_flashes: bool) -> Response {
    let jar = if shown_flashes { flash::clear(jar) } else { jar };
    (status, jar, Html(html)).into_response()
}

/// `303 See Other` to `to`, queueing `flashes` for the next page
pub(crate) fn redirect_with(jar: Jar, to: &str, flashes: &[Flash], secure: bool) -> Response {
    let jar = if flashes.is_empty() {
        jar
    } else {
        flash::push(jar, flashes, secure)
    };
    (jar, Redirect::to(to)).into_response()
}
