//! Domain logic for the Mango AI console.
//!
//! - [`suggestions`]: keyword-triggered follow-up questions for chat answers.
//! - [`knowledge`]: provenance classification, grouping and the batched
//!   delete coordinator for knowledge-base documents.
//! - [`types`]: the chat and knowledge-base data model shared with the server.

pub mod error;
pub mod knowledge;
pub mod suggestions;
pub mod types;

pub use error::{DeleteError, SuggestionError};
pub use knowledge::{
    classify, find_group, group, ConfirmationPrompt, DeleteCoordinator, DeleteKind,
    DeleteModalState, DeleteReport, DeleteTarget, DocumentDeleter, GroupData, KnowledgeStats,
    SourceGroup,
};
pub use suggestions::{Lexicon, SuggestionEngine};
pub use types::{DocumentId, KnowledgeDocument, Message, Role, Source, SourceType};
