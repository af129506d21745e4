//! Knowledge-base administration types.

use chrono::{DateTime, Utc};
use mango_core::{DeleteModalState, DeleteReport, DocumentId, KnowledgeDocument, KnowledgeStats, SourceGroup};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

pub const DEFAULT_MAX_PAGES: u32 = 10;
pub const DEFAULT_MAX_LENGTH: u32 = 5000;
pub const DEFAULT_CHUNK_SIZE: u32 = 1000;
pub const MIN_CHUNK_SIZE: u32 = 500;
pub const MAX_CHUNK_SIZE: u32 = 5000;

// ── Documents ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DocumentListResponse {
    pub documents: Vec<KnowledgeDocument>,
}

/// Request body for `POST /api/admin/documents`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct AddDocumentsRequest {
    #[validate(length(min = 1, message = "Informe ao menos um documento."))]
    pub documents: Vec<String>,
}

/// Request body for `DELETE /api/admin/documents`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct DeleteDocumentsRequest {
    #[validate(length(min = 1, message = "Informe ao menos um id."))]
    pub ids: Vec<DocumentId>,
}

/// Outcome of an add/delete proxied to the store.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MutationResponse {
    pub message: String,
    /// The store's own response body.
    #[schema(value_type = Object)]
    pub result: serde_json::Value,
}

/// Grouped view of the knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct KnowledgeOverview {
    pub stats: KnowledgeStats,
    pub groups: Vec<SourceGroup>,
    pub fetched_at: DateTime<Utc>,
}

// ── Ingestion ────────────────────────────────────────────────────────────────

fn default_max_pages() -> u32 {
    DEFAULT_MAX_PAGES
}

fn default_max_length() -> u32 {
    DEFAULT_MAX_LENGTH
}

/// Request body for `POST /api/admin/scrape-website`, forwarded as-is.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct ScrapeRequest {
    #[validate(url(message = "Por favor, insira uma URL válida."))]
    pub url: String,
    /// Follow the site's links instead of scraping a single page.
    #[serde(default)]
    pub scrape_multiple: bool,
    #[serde(default = "default_max_pages")]
    #[validate(range(min = 1, max = 50, message = "O número de páginas deve estar entre 1 e 50."))]
    pub max_pages: u32,
    /// Maximum characters kept per page.
    #[serde(default = "default_max_length")]
    #[validate(range(min = 100, max = 50000))]
    pub max_length: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ScrapeResponse {
    #[serde(default)]
    pub documents_added: u64,
    #[serde(default)]
    pub failed_urls: Vec<String>,
    #[serde(default)]
    pub scraped_urls: Vec<String>,
    #[serde(default)]
    pub message: String,
}

impl ScrapeResponse {
    pub fn summary(&self) -> String {
        let mut text = format!(
            "Scraping concluído! {} documentos adicionados.",
            self.documents_added
        );
        if !self.failed_urls.is_empty() {
            text.push_str(&format!(" {} URLs falharam.", self.failed_urls.len()));
        }
        text
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct PdfUploadResponse {
    #[serde(default)]
    pub documents_added: u64,
    #[serde(default)]
    pub total_pages: u64,
    #[serde(default)]
    pub message: String,
}

impl PdfUploadResponse {
    pub fn summary(&self) -> String {
        format!(
            "PDF processado! {} chunks adicionados de {} páginas.",
            self.documents_added, self.total_pages
        )
    }
}

// ── Deletion ─────────────────────────────────────────────────────────────────

/// Request body for `POST /api/admin/deletion`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DeleteRequest {
    /// One chunk.
    Single { doc_id: DocumentId },
    /// Every chunk of one source, by group key.
    Group { group_key: String },
}

/// Response body for `POST /api/admin/deletion/confirm`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteConfirmation {
    pub message: String,
    pub report: DeleteReport,
    pub state: DeleteModalState,
}
