//! Chat and knowledge-base data model.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Identifier assigned to a document by the backend store.
pub type DocumentId = i64;

// ── Chat ────────────────────────────────────────────────────────────────────

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Citation attached to an assistant answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Source {
    pub document_name: String,
}

/// A single turn of the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<Source>>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into(), sources: None }
    }

    pub fn assistant(content: impl Into<String>, sources: Vec<Source>) -> Self {
        Self { role: Role::Assistant, content: content.into(), sources: Some(sources) }
    }

    /// Copy of the message without citations, as the query service expects
    /// history entries.
    pub fn without_sources(&self) -> Self {
        Self { role: self.role, content: self.content.clone(), sources: None }
    }
}

// ── Knowledge base ──────────────────────────────────────────────────────────

/// A knowledge-base entry as listed by the backend document store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct KnowledgeDocument {
    pub id: DocumentId,
    /// Preview text; may be truncated by the store.
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl KnowledgeDocument {
    /// The document text: `full_content` when present, `content` otherwise.
    pub fn text(&self) -> &str {
        self.full_content.as_deref().unwrap_or(&self.content)
    }
}

/// Where a knowledge document came from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SourceType {
    Manual,
    Pdf,
    Website,
}
