//! Document list/add/delete proxies and the grouped overview.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use mango_core::{KnowledgeDocument, KnowledgeStats, SourceGroup, SourceType};
use tracing::info;
use utoipa::OpenApi;
use validator::Validate;

use super::load_overview;
use crate::error::ServerError;
use crate::schemas::knowledge::{
    AddDocumentsRequest, DeleteDocumentsRequest, DocumentListResponse, KnowledgeOverview,
    MutationResponse,
};
use crate::state::AppState;

pub const DOCUMENT_ADDED: &str = "Documento adicionado com sucesso!";
pub const DOCUMENT_DELETED: &str = "Documento excluído com sucesso!";
pub const EMPTY_DOCUMENT: &str = "O documento não pode estar vazio.";

#[derive(OpenApi)]
#[openapi(
    paths(list_documents, add_documents, delete_documents, knowledge_overview),
    components(schemas(
        DocumentListResponse,
        AddDocumentsRequest,
        DeleteDocumentsRequest,
        MutationResponse,
        KnowledgeOverview,
        KnowledgeDocument,
        KnowledgeStats,
        SourceGroup,
        SourceType,
    ))
)]
pub struct DocumentsApi;

#[utoipa::path(
    get,
    path = "/api/admin/documents",
    tag = "knowledge",
    responses(
        (status = 200, description = "Every document in the store", body = DocumentListResponse),
        (status = 401, description = "No admin session"),
    )
)]
pub async fn list_documents(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DocumentListResponse>, ServerError> {
    let documents = state.backend.list_documents().await?;
    Ok(Json(DocumentListResponse { documents }))
}

/// Add hand-written documents (`POST /api/admin/documents`).
///
/// Entries are trimmed; a blank entry rejects the whole request.
#[utoipa::path(
    post,
    path = "/api/admin/documents",
    tag = "knowledge",
    request_body = AddDocumentsRequest,
    responses(
        (status = 200, description = "Documents stored", body = MutationResponse),
        (status = 400, description = "Empty document"),
        (status = 401, description = "No admin session"),
        (status = 502, description = "Store failed"),
    )
)]
pub async fn add_documents(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddDocumentsRequest>,
) -> Result<Json<MutationResponse>, ServerError> {
    req.validate()?;
    let documents: Vec<String> = req.documents.iter().map(|d| d.trim().to_owned()).collect();
    if documents.iter().any(String::is_empty) {
        return Err(ServerError::BadRequest(EMPTY_DOCUMENT.into()));
    }

    let result = state.backend.add_documents(&documents).await?;
    info!(count = documents.len(), "documents added");
    Ok(Json(MutationResponse { message: DOCUMENT_ADDED.into(), result }))
}

/// Delete documents by id without confirmation (`DELETE /api/admin/documents`).
///
/// The console's own delete buttons go through `/api/admin/deletion`.
#[utoipa::path(
    delete,
    path = "/api/admin/documents",
    tag = "knowledge",
    request_body = DeleteDocumentsRequest,
    responses(
        (status = 200, description = "Documents deleted", body = MutationResponse),
        (status = 400, description = "No ids given"),
        (status = 401, description = "No admin session"),
        (status = 502, description = "Store failed"),
    )
)]
pub async fn delete_documents(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DeleteDocumentsRequest>,
) -> Result<Json<MutationResponse>, ServerError> {
    req.validate()?;
    let result = state.backend.delete_documents(&req.ids).await?;
    info!(ids = ?req.ids, "documents deleted");
    Ok(Json(MutationResponse { message: DOCUMENT_DELETED.into(), result }))
}

#[utoipa::path(
    get,
    path = "/api/admin/knowledge",
    tag = "knowledge",
    responses(
        (status = 200, description = "Stats and per-source groups", body = KnowledgeOverview),
        (status = 401, description = "No admin session"),
    )
)]
pub async fn knowledge_overview(
    State(state): State<Arc<AppState>>,
) -> Result<Json<KnowledgeOverview>, ServerError> {
    Ok(Json(load_overview(&state).await?))
}
