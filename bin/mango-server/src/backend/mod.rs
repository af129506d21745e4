//! HTTP client for the knowledge-base backend.
//!
//! The backend owns the document store, the query/answer engine, the website
//! scraper and the PDF ingester. This module is the only place that knows
//! their URLs and wire formats; handlers get typed results or a
//! [`BackendError`].

mod error;

pub use error::BackendError;

use mango_core::{DocumentDeleter, DocumentId, KnowledgeDocument, Message, Source};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::schemas::knowledge::{PdfUploadResponse, ScrapeRequest, ScrapeResponse};

const QUERY_PATH: &str = "api/assistant/query";
const DOCUMENTS_PATH: &str = "api/documents";
const DOCUMENTS_LIST_PATH: &str = "api/documents/list";
const SCRAPE_PATH: &str = "api/scrape-website";
const UPLOAD_PDF_PATH: &str = "api/upload-pdf";

/// An answer from the query service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub answer: String,
    pub sources: Vec<Source>,
}

/// A validated PDF ready to forward.
#[derive(Debug, Clone)]
pub struct PdfUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub chunk_size: u32,
}

// ── wire types ───────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct QueryPayload<'a> {
    query: &'a str,
    conversation_history: &'a [Message],
}

#[derive(Deserialize)]
struct QueryReply {
    #[serde(default, alias = "response")]
    answer: Option<String>,
    #[serde(default)]
    sources: Option<Vec<WireSource>>,
    #[serde(default)]
    error: Option<String>,
}

/// Sources arrive either as bare names or as `{ "document_name": ... }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireSource {
    Name(String),
    Object { document_name: String },
}

impl From<WireSource> for Source {
    fn from(w: WireSource) -> Self {
        match w {
            WireSource::Name(document_name) | WireSource::Object { document_name } => {
                Source { document_name }
            }
        }
    }
}

#[derive(Deserialize)]
struct DocumentList {
    #[serde(default)]
    documents: Vec<KnowledgeDocument>,
}

#[derive(Serialize)]
struct AddPayload<'a> {
    documents: &'a [String],
}

#[derive(Serialize)]
struct DeletePayload<'a> {
    ids: &'a [DocumentId],
}

// ── client ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct BackendClient {
    http: Client,
    base: Url,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Result<Self, BackendError> {
        let mut base = Url::parse(base_url)?;
        // `Url::join` replaces the last segment unless the path ends in '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self { http: Client::new(), base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        Ok(self.base.join(path)?)
    }

    /// Ask the query service; `history` is forwarded as-is.
    pub async fn query(&self, query: &str, history: &[Message]) -> Result<Answer, BackendError> {
        let url = self.endpoint(QUERY_PATH)?;
        debug!(%url, history_len = history.len(), "forwarding chat query");
        let resp = self
            .http
            .post(url)
            .json(&QueryPayload { query, conversation_history: history })
            .send()
            .await?;
        let reply: QueryReply = decode(ensure_success(resp).await?).await?;

        match (reply.answer, reply.error) {
            (Some(answer), _) => Ok(Answer {
                answer,
                sources: reply.sources.unwrap_or_default().into_iter().map(Source::from).collect(),
            }),
            (None, Some(message)) => Err(BackendError::Reported { message }),
            (None, None) => Err(BackendError::Malformed("reply has no answer".into())),
        }
    }

    /// List every document in the store.
    ///
    /// A store that answers with an error status is treated as empty, so the
    /// console keeps working while the listing endpoint is unavailable.
    pub async fn list_documents(&self) -> Result<Vec<KnowledgeDocument>, BackendError> {
        match self.fetch_documents().await {
            Err(BackendError::Status { status, .. }) => {
                warn!(status, "document listing failed; showing an empty list");
                Ok(Vec::new())
            }
            other => other,
        }
    }

    /// Like [`Self::list_documents`], but an error status is an error.
    pub async fn fetch_documents(&self) -> Result<Vec<KnowledgeDocument>, BackendError> {
        let resp = self.http.get(self.endpoint(DOCUMENTS_LIST_PATH)?).send().await?;
        let list: DocumentList = decode(ensure_success(resp).await?).await?;
        Ok(list.documents)
    }

    pub async fn add_documents(&self, documents: &[String]) -> Result<serde_json::Value, BackendError> {
        let resp = self
            .http
            .post(self.endpoint(DOCUMENTS_PATH)?)
            .json(&AddPayload { documents })
            .send()
            .await?;
        decode(ensure_success(resp).await?).await
    }

    pub async fn delete_documents(&self, ids: &[DocumentId]) -> Result<serde_json::Value, BackendError> {
        let resp = self
            .http
            .delete(self.endpoint(DOCUMENTS_PATH)?)
            .json(&DeletePayload { ids })
            .send()
            .await?;
        decode(ensure_success(resp).await?).await
    }

    pub async fn scrape_website(&self, req: &ScrapeRequest) -> Result<ScrapeResponse, BackendError> {
        let resp = self.http.post(self.endpoint(SCRAPE_PATH)?).json(req).send().await?;
        decode(ensure_success(resp).await?).await
    }

    pub async fn upload_pdf(&self, upload: PdfUpload) -> Result<PdfUploadResponse, BackendError> {
        let size = upload.bytes.len();
        let file = Part::bytes(upload.bytes)
            .file_name(upload.file_name.clone())
            .mime_str("application/pdf")?;
        let form = Form::new()
            .part("file", file)
            .text("chunk_size", upload.chunk_size.to_string());

        debug!(file_name = %upload.file_name, size_bytes = size, chunk_size = upload.chunk_size, "forwarding PDF");
        let resp = self
            .http
            .post(self.endpoint(UPLOAD_PDF_PATH)?)
            .multipart(form)
            .send()
            .await?;
        decode(ensure_success(resp).await?).await
    }
}

impl DocumentDeleter for BackendClient {
    type Error = BackendError;

    async fn delete_document(&self, id: DocumentId) -> Result<(), BackendError> {
        self.delete_documents(&[id]).await.map(|_| ())
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

/// Turn a non-2xx response into [`BackendError::Status`], keeping the
/// backend's own message (`error` or FastAPI's `detail`) when it sent one.
async fn ensure_success(resp: Response) -> Result<Response, BackendError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = resp
        .json::<serde_json::Value>()
        .await
        .ok()
        .and_then(|body| error_message(&body));
    warn!(status = status.as_u16(), message = ?message, "backend returned an error status");
    Err(BackendError::Status { status: status.as_u16(), message })
}

fn error_message(body: &serde_json::Value) -> Option<String> {
    ["error", "detail", "message"]
        .iter()
        .find_map(|key| body.get(*key).and_then(|v| v.as_str()))
        .map(str::to_owned)
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, BackendError> {
    resp.json::<T>().await.map_err(BackendError::Decode)
}
