//! In-process stand-in for the knowledge-base backend, shared by the router
//! and client tests.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::extract::{Multipart, State};
use axum::http::{Request, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use http_body_util::BodyExt;
use mango_core::{DocumentId, KnowledgeDocument};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use crate::config::Config;
use crate::middleware::auth::{ADMIN_COOKIE, AUTHENTICATED};
use crate::state::AppState;

/// Query text that makes the fake query service fail.
pub const FAILING_QUERY: &str = "erro";
pub const QUERY_FAILURE_DETAIL: &str = "Falha no modelo de linguagem";

/// What the fake saw of a PDF upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedUpload {
    pub file_name: Option<String>,
    pub size: usize,
    pub chunk_size: Option<String>,
}

#[derive(Default)]
struct Inner {
    documents: Mutex<Vec<KnowledgeDocument>>,
    calls: Mutex<Vec<String>>,
    deleted_ids: Mutex<Vec<Vec<DocumentId>>>,
    failing_ids: Mutex<Vec<DocumentId>>,
    fail_listing: AtomicBool,
    last_query: Mutex<Option<Value>>,
    last_scrape: Mutex<Option<Value>>,
    last_upload: Mutex<Option<ReceivedUpload>>,
}

impl Inner {
    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_owned());
    }
}

/// A backend bound on `127.0.0.1:0` that records every call it receives.
#[derive(Clone)]
pub struct FakeBackend {
    addr: SocketAddr,
    inner: Arc<Inner>,
}

impl FakeBackend {
    pub async fn spawn(documents: Vec<KnowledgeDocument>) -> Self {
        let inner = Arc::new(Inner { documents: Mutex::new(documents), ..Inner::default() });

        let app = Router::new()
            .route("/api/assistant/query", post(query))
            .route("/api/documents/list", get(list_documents))
            .route("/api/documents", post(add_documents).delete(delete_documents))
            .route("/api/scrape-website", post(scrape_website))
            .route("/api/upload-pdf", post(upload_pdf))
            .with_state(inner.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, inner }
    }

    /// Two chunks of one scraped page, one PDF chunk, one manual entry.
    pub fn sample_documents() -> Vec<KnowledgeDocument> {
        let doc = |id, content: &str| KnowledgeDocument {
            id,
            content: content.into(),
            full_content: None,
            url: None,
            title: None,
        };
        vec![
            doc(1, "URL: https://www.ifpe.br/cursos\n\nCursos técnicos e superiores."),
            doc(2, "URL: https://www.ifpe.br/cursos\n\nInscrições pelo portal."),
            doc(3, "Arquivo: edital.pdf\nTipo: PDF\n\nEdital de seleção 2024."),
            doc(4, "A biblioteca abre das 8h às 21h."),
        ]
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Names of the endpoints hit so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.inner.calls.lock().unwrap().clone()
    }

    /// Id lists of every delete call, in order.
    pub fn deleted_ids(&self) -> Vec<Vec<DocumentId>> {
        self.inner.deleted_ids.lock().unwrap().clone()
    }

    pub fn fail_listing(&self) {
        self.inner.fail_listing.store(true, Ordering::SeqCst);
    }

    /// Make deletes of `id` answer 500.
    pub fn fail_delete(&self, id: DocumentId) {
        self.inner.failing_ids.lock().unwrap().push(id);
    }

    pub fn remove_documents(&self, ids: &[DocumentId]) {
        self.inner.documents.lock().unwrap().retain(|d| !ids.contains(&d.id));
    }

    pub fn last_query(&self) -> Option<Value> {
        self.inner.last_query.lock().unwrap().clone()
    }

    pub fn last_scrape(&self) -> Option<Value> {
        self.inner.last_scrape.lock().unwrap().clone()
    }

    pub fn last_upload(&self) -> Option<ReceivedUpload> {
        self.inner.last_upload.lock().unwrap().clone()
    }
}

async fn query(State(inner): State<Arc<Inner>>, Json(body): Json<Value>) -> impl IntoResponse {
    inner.record("query");
    *inner.last_query.lock().unwrap() = Some(body.clone());

    let query = body["query"].as_str().unwrap_or_default().to_owned();
    if query == FAILING_QUERY {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "detail": QUERY_FAILURE_DETAIL })));
    }
    (
        StatusCode::OK,
        Json(json!({
            "response": format!("Sobre '{query}': a matrícula é feita no campus."),
            "sources": [{ "document_name": "edital.pdf" }],
        })),
    )
}

async fn list_documents(State(inner): State<Arc<Inner>>) -> impl IntoResponse {
    inner.record("list");
    if inner.fail_listing.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "detail": "indisponível" })));
    }
    let documents = inner.documents.lock().unwrap().clone();
    (StatusCode::OK, Json(json!({ "documents": documents })))
}

async fn add_documents(State(inner): State<Arc<Inner>>, Json(body): Json<Value>) -> Json<Value> {
    inner.record("add");
    let added = body["documents"].as_array().map_or(0, Vec::len);
    Json(json!({ "status": "ok", "added": added }))
}

async fn delete_documents(State(inner): State<Arc<Inner>>, Json(body): Json<Value>) -> impl IntoResponse {
    inner.record("delete");
    let ids: Vec<DocumentId> = serde_json::from_value(body["ids"].clone()).unwrap_or_default();
    inner.deleted_ids.lock().unwrap().push(ids.clone());

    let failing = inner.failing_ids.lock().unwrap().clone();
    if ids.iter().any(|id| failing.contains(id)) {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "detail": "falha ao excluir" })));
    }
    inner.documents.lock().unwrap().retain(|d| !ids.contains(&d.id));
    (StatusCode::OK, Json(json!({ "deleted": ids })))
}

async fn scrape_website(State(inner): State<Arc<Inner>>, Json(body): Json<Value>) -> Json<Value> {
    inner.record("scrape");
    *inner.last_scrape.lock().unwrap() = Some(body.clone());
    Json(json!({
        "documents_added": 3,
        "failed_urls": ["https://www.ifpe.br/quebrado"],
        "scraped_urls": [body["url"]],
    }))
}

async fn upload_pdf(State(inner): State<Arc<Inner>>, mut multipart: Multipart) -> Json<Value> {
    inner.record("upload");
    let mut upload = ReceivedUpload { file_name: None, size: 0, chunk_size: None };
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") => {
                upload.file_name = field.file_name().map(str::to_owned);
                upload.size = field.bytes().await.unwrap().len();
            }
            Some("chunk_size") => upload.chunk_size = Some(field.text().await.unwrap()),
            _ => {}
        }
    }
    *inner.last_upload.lock().unwrap() = Some(upload);
    Json(json!({ "documents_added": 7, "total_pages": 2 }))
}

// ── router helpers ───────────────────────────────────────────────────────────

/// State wired to `backend_url`, with access code `segredo`.
pub fn test_state(backend_url: &str) -> Arc<AppState> {
    let config = Config {
        backend_url: backend_url.to_owned(),
        admin_access_code: "segredo".into(),
        ..Config::default()
    };
    Arc::new(AppState::new(config).unwrap())
}

/// The full application router wired to `backend_url`.
pub fn test_app(backend_url: &str) -> Router {
    crate::routes::build(test_state(backend_url))
}

/// A URL nothing listens on.
pub async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// A URL that accepts connections but never answers until `release` fires,
/// at which point every held connection is closed.
pub async fn stalled_url() -> (String, tokio::sync::oneshot::Sender<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (release, mut released) = tokio::sync::oneshot::channel::<()>();
    tokio::spawn(async move {
        let mut held = Vec::new();
        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    if let Ok((socket, _)) = accepted {
                        held.push(socket);
                    }
                }
                _ = &mut released => break,
            }
        }
    });
    (format!("http://{addr}"), release)
}

pub fn admin_cookie() -> String {
    format!("{ADMIN_COOKIE}={AUTHENTICATED}")
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn admin_json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    let mut req = json_request(method, uri, body);
    req.headers_mut().insert("cookie", admin_cookie().parse().unwrap());
    req
}

pub fn admin_get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("cookie", admin_cookie())
        .body(Body::empty())
        .unwrap()
}

pub const MULTIPART_BOUNDARY: &str = "mango-test-boundary";

/// A `multipart/form-data` body with one file part and optional text parts.
pub fn multipart_body(
    file_name: &str,
    content_type: &str,
    contents: &[u8],
    fields: &[(&str, &str)],
) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(contents);
    body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn admin_upload_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/admin/upload-pdf")
        .header("cookie", admin_cookie())
        .header(
            "content-type",
            format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
