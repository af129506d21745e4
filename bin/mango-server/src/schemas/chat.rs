//! Chat request / response types.

use mango_core::{Message, Source};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatRequest {
    /// The user's new message.
    pub query: String,
    /// Earlier turns of the conversation, oldest first.
    #[serde(default)]
    pub conversation_history: Vec<Message>,
}

/// Response body for `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatResponse {
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<Source>,
    /// Up to three follow-up questions derived from the answer.
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// Response body for `GET /api/chat/starters`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StarterQuestions {
    pub questions: Vec<String>,
}
