//! The console's landing view: counts per provenance and grouped sources.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::routes::knowledge::load_overview;
use crate::schemas::knowledge::KnowledgeOverview;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(admin_overview))]
pub struct OverviewApi;

/// Admin landing page data (`GET /admin`).
#[utoipa::path(
    get,
    path = "/admin",
    tag = "admin",
    responses(
        (status = 200, description = "Knowledge-base overview", body = KnowledgeOverview),
        (status = 303, description = "No admin session; redirect to /admin/login"),
    )
)]
pub async fn admin_overview(
    State(state): State<Arc<AppState>>,
) -> Result<Json<KnowledgeOverview>, ServerError> {
    Ok(Json(load_overview(&state).await?))
}
