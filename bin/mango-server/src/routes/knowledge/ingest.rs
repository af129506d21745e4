//! Website scraping and PDF upload proxies.
//!
//! Both are long-running on the backend side; inputs are validated here so
//! that a bad URL or file never costs a backend round-trip.

use std::sync::Arc;

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::{debug, info};
use utoipa::{OpenApi, ToSchema};
use validator::Validate;

use crate::backend::PdfUpload;
use crate::error::ServerError;
use crate::schemas::knowledge::{
    PdfUploadResponse, ScrapeRequest, ScrapeResponse, DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE,
    MIN_CHUNK_SIZE,
};
use crate::state::AppState;

pub const MISSING_URL: &str = "Por favor, insira uma URL.";
pub const NOT_A_PDF: &str = "Por favor, selecione um arquivo PDF válido.";
pub const MISSING_FILE: &str = "Nenhum arquivo enviado.";
pub const EMPTY_FILE: &str = "O arquivo enviado está vazio.";

/// Multipart body of `POST /api/admin/upload-pdf`.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct PdfUploadForm {
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
    /// Characters per stored chunk, 500 to 5000 (default 1000).
    chunk_size: Option<u32>,
}

#[derive(OpenApi)]
#[openapi(
    paths(scrape_website, upload_pdf),
    components(schemas(ScrapeRequest, ScrapeResponse, PdfUploadResponse, PdfUploadForm))
)]
pub struct IngestApi;

/// Scrape a website into the knowledge base (`POST /api/admin/scrape-website`).
///
/// The reply's `message` is replaced with a summary of what was added.
#[utoipa::path(
    post,
    path = "/api/admin/scrape-website",
    tag = "knowledge",
    request_body = ScrapeRequest,
    responses(
        (status = 200, description = "Scrape finished", body = ScrapeResponse),
        (status = 400, description = "Missing or malformed URL, or out-of-range limits"),
        (status = 401, description = "No admin session"),
        (status = 502, description = "Scraper failed"),
    )
)]
pub async fn scrape_website(
    State(state): State<Arc<AppState>>,
    Json(mut req): Json<ScrapeRequest>,
) -> Result<Json<ScrapeResponse>, ServerError> {
    req.url = req.url.trim().to_owned();
    if req.url.is_empty() {
        return Err(ServerError::BadRequest(MISSING_URL.into()));
    }
    req.validate()?;

    debug!(url = %req.url, multiple = req.scrape_multiple, max_pages = req.max_pages, "scraping website");
    let mut resp = state.backend.scrape_website(&req).await?;
    resp.message = resp.summary();

    info!(
        url = %req.url,
        documents_added = resp.documents_added,
        failed = resp.failed_urls.len(),
        "website scraped"
    );
    Ok(Json(resp))
}

/// Upload a PDF into the knowledge base (`POST /api/admin/upload-pdf`).
///
/// Accepts `multipart/form-data` with a `file` part and an optional
/// `chunk_size` part. The file must look like a PDF (content type or `.pdf`
/// name) and fit the configured size limit.
#[utoipa::path(
    post,
    path = "/api/admin/upload-pdf",
    tag = "knowledge",
    request_body(content = PdfUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "PDF ingested", body = PdfUploadResponse),
        (status = 400, description = "Missing, empty or non-PDF file, or bad chunk size"),
        (status = 401, description = "No admin session"),
        (status = 413, description = "File too large"),
        (status = 502, description = "Ingester failed"),
    )
)]
pub async fn upload_pdf(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<PdfUploadResponse>, ServerError> {
    let max_bytes = state.config.max_pdf_bytes;
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut chunk_size = DEFAULT_CHUNK_SIZE;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") => file = Some(read_pdf(field, max_bytes).await?),
            Some("chunk_size") => {
                let raw = field.text().await.map_err(multipart_error)?;
                chunk_size = parse_chunk_size(&raw)?;
            }
            _ => {}
        }
    }

    let (file_name, bytes) = file.ok_or_else(|| ServerError::BadRequest(MISSING_FILE.into()))?;
    if bytes.is_empty() {
        return Err(ServerError::BadRequest(EMPTY_FILE.into()));
    }

    let size = bytes.len();
    let mut resp = state
        .backend
        .upload_pdf(PdfUpload { file_name: file_name.clone(), bytes, chunk_size })
        .await?;
    resp.message = resp.summary();

    info!(
        file_name = %file_name,
        size_bytes = size,
        documents_added = resp.documents_added,
        total_pages = resp.total_pages,
        "PDF ingested"
    );
    Ok(Json(resp))
}

/// Check the part's type and stream it in, stopping at `max_bytes`.
async fn read_pdf(mut field: Field<'_>, max_bytes: usize) -> Result<(String, Vec<u8>), ServerError> {
    let file_name = field.file_name().unwrap_or("documento.pdf").to_owned();
    let content_type = field.content_type().unwrap_or_default().to_owned();
    if !looks_like_pdf(&file_name, &content_type) {
        return Err(ServerError::BadRequest(NOT_A_PDF.into()));
    }

    let mut bytes = Vec::new();
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        bytes.extend_from_slice(&chunk);
        if bytes.len() > max_bytes {
            return Err(too_large(max_bytes));
        }
    }
    Ok((file_name, bytes))
}

fn looks_like_pdf(file_name: &str, content_type: &str) -> bool {
    content_type.to_ascii_lowercase().contains("pdf")
        || file_name.to_ascii_lowercase().ends_with(".pdf")
}

fn parse_chunk_size(raw: &str) -> Result<u32, ServerError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(DEFAULT_CHUNK_SIZE);
    }
    raw.parse::<u32>()
        .ok()
        .filter(|n| (MIN_CHUNK_SIZE..=MAX_CHUNK_SIZE).contains(n))
        .ok_or_else(|| {
            ServerError::BadRequest(format!(
                "O tamanho do chunk deve estar entre {MIN_CHUNK_SIZE} e {MAX_CHUNK_SIZE}."
            ))
        })
}

fn too_large(max_bytes: usize) -> ServerError {
    ServerError::PayloadTooLarge(format!(
        "Arquivo muito grande. Máximo {}MB.",
        max_bytes / (1024 * 1024)
    ))
}

fn multipart_error(e: MultipartError) -> ServerError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ServerError::PayloadTooLarge(e.body_text())
    } else {
        ServerError::BadRequest(format!("Falha ao ler o envio: {}", e.body_text()))
    }
}
