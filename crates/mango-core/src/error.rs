use thiserror::Error;

/// Errors raised by the batch-delete coordinator's state transitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeleteError {
    /// A confirmed batch is still being executed.
    #[error("a deletion is already in progress")]
    Busy,

    /// `confirm` was called with no pending request.
    #[error("no deletion is awaiting confirmation")]
    NothingPending,

    /// A group delete was requested for a group with no members.
    #[error("group '{0}' has no documents to delete")]
    EmptyGroup(String),
}

/// Errors raised while loading a suggestion lexicon.
#[derive(Debug, Error)]
pub enum SuggestionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// The lexicon parsed but violates its shape rules.
    #[error("invalid lexicon: {message}")]
    InvalidLexicon { message: String },
}
