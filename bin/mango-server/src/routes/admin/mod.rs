//! Admin console pages: login, logout and the knowledge overview.

pub mod overview;
pub mod session;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::{middleware, Router};
use utoipa::OpenApi;

use crate::middleware::auth;
use crate::state::AppState;

/// `/admin/login` is open; every other page sits behind the page gate.
pub fn router() -> Router<Arc<AppState>> {
    let gated = Router::new()
        .route("/admin", get(overview::admin_overview))
        .route("/admin/logout", post(session::logout))
        .route_layer(middleware::from_fn(auth::require_admin_page));

    Router::new()
        .route("/admin/login", get(session::login_page).post(session::login))
        .merge(gated)
}

#[derive(OpenApi)]
#[openapi()]
pub struct AdminApi;

pub fn api_docs() -> utoipa::openapi::OpenApi {
    let mut doc = AdminApi::openapi();
    doc.merge(session::SessionApi::openapi());
    doc.merge(overview::OverviewApi::openapi());
    doc
}
