//! Public chat routes.
//!
//! The query service owns retrieval and answer generation; this module only
//! validates the turn, strips citations from the history it forwards and
//! attaches follow-up suggestions to the answer.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use mango_core::{Message, Role, Source};
use tracing::{debug, info};
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::schemas::chat::{ChatRequest, ChatResponse, StarterQuestions};
use crate::state::AppState;

/// Maximum allowed query length in bytes.
const MAX_QUERY_BYTES: usize = 16 * 1024;

/// Questions offered on the welcome screen before the first turn.
pub const STARTER_QUESTIONS: [&str; 4] = [
    "Como me inscrever no IFPE?",
    "Quais cursos estão disponíveis?",
    "Onde fica o campus?",
    "Como funciona a matrícula?",
];

pub const EMPTY_QUERY: &str = "A mensagem não pode estar vazia.";

#[derive(OpenApi)]
#[openapi(
    paths(chat, starter_questions),
    components(schemas(ChatRequest, ChatResponse, StarterQuestions, Message, Role, Source))
)]
pub struct ChatApi;

/// Register chat routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/chat", post(chat))
        .route("/api/chat/starters", get(starter_questions))
}

/// Send one chat turn to the query service (`POST /api/chat`).
///
/// History entries are forwarded without their `sources`. The reply carries
/// up to three follow-up questions derived from the answer text.
#[utoipa::path(
    post,
    path = "/api/chat",
    tag = "chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Answer generated", body = ChatResponse),
        (status = 400, description = "Empty or oversized query"),
        (status = 502, description = "Query service failed"),
    )
)]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ServerError> {
    let query = req.query.trim();
    if query.is_empty() {
        return Err(ServerError::BadRequest(EMPTY_QUERY.into()));
    }
    if query.len() > MAX_QUERY_BYTES {
        return Err(ServerError::BadRequest(format!(
            "A mensagem é muito longa ({} bytes); o máximo é {MAX_QUERY_BYTES} bytes.",
            query.len()
        )));
    }

    let history: Vec<Message> = req
        .conversation_history
        .iter()
        .map(Message::without_sources)
        .collect();
    debug!(query_len = query.len(), history_len = history.len(), "chat turn");

    let answer = state.backend.query(query, &history).await?;
    let suggestions = state.suggestions.generate(&answer.answer);

    info!(
        answer_len = answer.answer.len(),
        sources = answer.sources.len(),
        suggestions = suggestions.len(),
        "chat answer ready"
    );

    Ok(Json(ChatResponse {
        answer: answer.answer,
        sources: answer.sources,
        suggestions,
    }))
}

/// Welcome-screen questions (`GET /api/chat/starters`).
#[utoipa::path(
    get,
    path = "/api/chat/starters",
    tag = "chat",
    responses((status = 200, description = "Starter questions", body = StarterQuestions))
)]
pub async fn starter_questions() -> Json<StarterQuestions> {
    Json(StarterQuestions {
        questions: STARTER_QUESTIONS.iter().map(|q| (*q).to_owned()).collect(),
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::BACKEND_UNREACHABLE;
    use crate::test_support::*;
    use axum::http::StatusCode;
    use serde_json::json;
    use tower::ServiceExt;
    use tracing_test::traced_test;

    #[tokio::test]
    #[traced_test]
    async fn answer_comes_back_with_sources_and_suggestions() {
        let fake = FakeBackend::spawn(Vec::new()).await;
        let app = test_app(&fake.url());

        let resp = app
            .oneshot(json_request(
                "POST",
                "/api/chat",
                json!({ "query": "  Como faço a matrícula?  " }),
            ))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["answer"], "Sobre 'Como faço a matrícula?': a matrícula é feita no campus.");
        assert_eq!(body["sources"][0]["document_name"], "edital.pdf");
        // "matrícula" then "campus": two hits, no fallback.
        assert_eq!(body["suggestions"].as_array().unwrap().len(), 3);
        assert!(logs_contain("chat answer ready"));
    }

    #[tokio::test]
    async fn history_is_forwarded_without_sources() {
        let fake = FakeBackend::spawn(Vec::new()).await;
        let app = test_app(&fake.url());

        app.oneshot(json_request(
            "POST",
            "/api/chat",
            json!({
                "query": "E o horário?",
                "conversation_history": [
                    { "role": "user", "content": "Onde fica o campus?" },
                    { "role": "assistant", "content": "No Recife.", "sources": [{ "document_name": "site" }] },
                ],
            }),
        ))
        .await
        .unwrap();

        let sent = fake.last_query().unwrap();
        assert_eq!(sent["query"], "E o horário?");
        let history = sent["conversation_history"].as_array().unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1]["role"], "assistant");
        assert!(history[1].get("sources").is_none());
    }

    #[tokio::test]
    async fn blank_query_never_reaches_the_backend() {
        let fake = FakeBackend::spawn(Vec::new()).await;
        let app = test_app(&fake.url());

        let resp = app
            .oneshot(json_request("POST", "/api/chat", json!({ "query": "   " })))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["error"], EMPTY_QUERY);
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn backend_error_detail_is_shown_verbatim() {
        let fake = FakeBackend::spawn(Vec::new()).await;
        let app = test_app(&fake.url());

        let resp = app
            .oneshot(json_request("POST", "/api/chat", json!({ "query": FAILING_QUERY })))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(body_json(resp).await["error"], QUERY_FAILURE_DETAIL);
    }

    #[tokio::test]
    async fn unreachable_backend_gives_a_generic_error() {
        let app = test_app(&unreachable_url().await);

        let resp = app
            .oneshot(json_request("POST", "/api/chat", json!({ "query": "Olá" })))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(body_json(resp).await["error"], BACKEND_UNREACHABLE);
    }

    #[tokio::test]
    async fn starters_are_listed() {
        let Json(body) = starter_questions().await;
        assert_eq!(body.questions.len(), 4);
        assert_eq!(body.questions[0], "Como me inscrever no IFPE?");
    }
}
