//! Knowledge-base administration API under `/api/admin`.
//!
//! Every route here sits behind the API gate and answers 401 JSON without
//! the admin session cookie.

pub mod deletion;
pub mod documents;
pub mod ingest;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{middleware, Router};
use chrono::Utc;
use mango_core::{group, KnowledgeStats};
use utoipa::OpenApi;

use crate::backend::BackendError;
use crate::middleware::auth;
use crate::schemas::knowledge::KnowledgeOverview;
use crate::state::AppState;

pub fn router(state: &AppState) -> Router<Arc<AppState>> {
    // Room for the multipart framing around a maximum-size PDF; the handler
    // enforces the exact file limit itself.
    let upload_limit = state.config.max_pdf_bytes.saturating_mul(2);

    Router::new()
        .route(
            "/api/admin/documents",
            get(documents::list_documents)
                .post(documents::add_documents)
                .delete(documents::delete_documents),
        )
        .route("/api/admin/knowledge", get(documents::knowledge_overview))
        .route("/api/admin/scrape-website", post(ingest::scrape_website))
        .route(
            "/api/admin/upload-pdf",
            post(ingest::upload_pdf).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/api/admin/deletion",
            get(deletion::deletion_state).post(deletion::request_deletion),
        )
        .route("/api/admin/deletion/confirm", post(deletion::confirm_deletion))
        .route("/api/admin/deletion/cancel", post(deletion::cancel_deletion))
        .route_layer(middleware::from_fn(auth::require_admin_api))
}

/// Fetch the document list and fold it into stats and groups.
pub async fn load_overview(state: &AppState) -> Result<KnowledgeOverview, BackendError> {
    let documents = state.backend.list_documents().await?;
    Ok(KnowledgeOverview {
        stats: KnowledgeStats::from_documents(&documents),
        groups: group(&documents),
        fetched_at: Utc::now(),
    })
}

#[derive(OpenApi)]
#[openapi()]
pub struct KnowledgeApi;

pub fn api_docs() -> utoipa::openapi::OpenApi {
    let mut doc = KnowledgeApi::openapi();
    doc.merge(documents::DocumentsApi::openapi());
    doc.merge(ingest::IngestApi::openapi());
    doc.merge(deletion::DeletionApi::openapi());
    doc
}
