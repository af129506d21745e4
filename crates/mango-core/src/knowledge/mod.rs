//! Knowledge-base presentation and maintenance.
//!
//! Documents arrive from the backend store as a flat list. [`classify`] tells
//! where each one came from, [`group`] folds them into one entry per source
//! (a website, a PDF file, or the manual pool) and [`delete`] drives the
//! confirm-then-delete flow for a single chunk or a whole source.

pub mod classify;
pub mod delete;
pub mod group;

pub use classify::{classify, Classification};
pub use delete::{
    ConfirmationPrompt, DeleteCoordinator, DeleteKind, DeleteModalState, DeleteReport,
    DeleteTarget, DocumentDeleter, GroupData,
};
pub use group::{find_group, group, KnowledgeStats, SourceGroup};
