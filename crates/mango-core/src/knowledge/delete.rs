//! Confirm-then-delete coordination for knowledge documents.
//!
//! A delete intent first parks in [`DeleteCoordinator`] as a pending target,
//! which the console shows as a confirmation prompt. Confirming runs one
//! backend delete per captured id, strictly one after another, and always
//! returns the coordinator to idle no matter how many of them failed.
//!
//! ```text
//! Idle ──request──▶ ConfirmPending ──begin_confirm──▶ Deleting ──finish──▶ Idle
//!   ▲                     │
//!   └──────cancel─────────┘
//! ```

use std::fmt::Display;
use std::future::Future;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::group::SourceGroup;
use crate::error::DeleteError;
use crate::types::{DocumentId, KnowledgeDocument};

/// Removes a single document from the backing store.
///
/// Implemented by the server's backend client; tests use in-memory fakes.
pub trait DocumentDeleter: Send + Sync {
    type Error: Display + Send;

    fn delete_document(
        &self,
        id: DocumentId,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// What a pending delete will remove, captured when the request was made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTarget {
    Single {
        doc_id: DocumentId,
    },
    Group {
        group_key: String,
        title: String,
        docs: Vec<KnowledgeDocument>,
    },
}

impl DeleteTarget {
    pub fn single(doc_id: DocumentId) -> Self {
        Self::Single { doc_id }
    }

    /// Snapshot a group's members. Later changes to the document list do
    /// not affect the returned target.
    pub fn group(group: &SourceGroup) -> Result<Self, DeleteError> {
        if group.docs.is_empty() {
            return Err(DeleteError::EmptyGroup(group.group_key.clone()));
        }
        Ok(Self::Group {
            group_key: group.group_key.clone(),
            title: group.title.clone(),
            docs: group.docs.clone(),
        })
    }

    pub fn doc_ids(&self) -> Vec<DocumentId> {
        match self {
            Self::Single { doc_id } => vec![*doc_id],
            Self::Group { docs, .. } => docs.iter().map(|d| d.id).collect(),
        }
    }

    pub fn kind(&self) -> DeleteKind {
        match self {
            Self::Single { .. } => DeleteKind::Single,
            Self::Group { .. } => DeleteKind::Group,
        }
    }

    /// Prompt text for the confirmation dialog.
    pub fn prompt(&self) -> ConfirmationPrompt {
        const IRREVERSIBLE: &str = "Esta ação não pode ser desfeita.";
        let (title, message, confirm_text) = match self {
            Self::Single { .. } => (
                "Confirmar exclusão".to_owned(),
                format!("Tem certeza que deseja excluir este documento? {IRREVERSIBLE}"),
                "Excluir".to_owned(),
            ),
            Self::Group { title, docs, .. } if docs.len() == 1 => (
                "Excluir fonte".to_owned(),
                format!("Tem certeza que deseja excluir o documento de \"{title}\"? {IRREVERSIBLE}"),
                "Excluir documento".to_owned(),
            ),
            Self::Group { title, docs, .. } => (
                "Excluir fonte".to_owned(),
                format!(
                    "Tem certeza que deseja excluir todos os {} documentos de \"{title}\"? {IRREVERSIBLE}",
                    docs.len()
                ),
                format!("Excluir {} documentos", docs.len()),
            ),
        };
        ConfirmationPrompt { title, message, confirm_text, cancel_text: "Cancelar".to_owned() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum DeleteKind {
    Single,
    Group,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ConfirmationPrompt {
    pub title: String,
    pub message: String,
    pub confirm_text: String,
    pub cancel_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct GroupData {
    pub group_key: String,
    pub doc_ids: Vec<DocumentId>,
    pub title: String,
    pub docs: Vec<KnowledgeDocument>,
}

/// Serializable view of the confirmation dialog.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DeleteModalState {
    pub is_open: bool,
    /// `true` while a confirmed batch is still running.
    #[serde(default)]
    pub in_progress: bool,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<DeleteKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<DocumentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_data: Option<GroupData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<ConfirmationPrompt>,
}

impl DeleteModalState {
    fn open(target: &DeleteTarget, in_progress: bool) -> Self {
        let (doc_id, group_data) = match target {
            DeleteTarget::Single { doc_id } => (Some(*doc_id), None),
            DeleteTarget::Group { group_key, title, docs } => (
                None,
                Some(GroupData {
                    group_key: group_key.clone(),
                    doc_ids: target.doc_ids(),
                    title: title.clone(),
                    docs: docs.clone(),
                }),
            ),
        };
        Self {
            is_open: true,
            in_progress,
            kind: Some(target.kind()),
            doc_id,
            group_data,
            prompt: Some(target.prompt()),
        }
    }
}

/// Outcome of a confirmed delete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DeleteReport {
    pub requested: usize,
    pub deleted: Vec<DocumentId>,
    pub failed: Vec<DocumentId>,
}

impl DeleteReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum Phase {
    #[default]
    Idle,
    ConfirmPending(DeleteTarget),
    Deleting(DeleteTarget),
}

/// The confirmation state machine.
#[derive(Debug, Clone, Default)]
pub struct DeleteCoordinator {
    phase: Phase,
}

impl DeleteCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    pub fn is_deleting(&self) -> bool {
        matches!(self.phase, Phase::Deleting(_))
    }

    pub fn pending(&self) -> Option<&DeleteTarget> {
        match &self.phase {
            Phase::ConfirmPending(t) => Some(t),
            _ => None,
        }
    }

    pub fn modal_state(&self) -> DeleteModalState {
        match &self.phase {
            Phase::Idle => DeleteModalState::default(),
            Phase::ConfirmPending(t) => DeleteModalState::open(t, false),
            Phase::Deleting(t) => DeleteModalState::open(t, true),
        }
    }

    /// Park `target` for confirmation, replacing any earlier pending target.
    pub fn request_delete(&mut self, target: DeleteTarget) -> Result<DeleteModalState, DeleteError> {
        if self.is_deleting() {
            return Err(DeleteError::Busy);
        }
        debug!(kind = ?target.kind(), doc_ids = ?target.doc_ids(), "delete requested");
        self.phase = Phase::ConfirmPending(target);
        Ok(self.modal_state())
    }

    /// Dismiss the pending target. Returns `false` when nothing was pending.
    pub fn cancel(&mut self) -> bool {
        match self.phase {
            Phase::ConfirmPending(_) => {
                debug!("delete cancelled");
                self.phase = Phase::Idle;
                true
            }
            _ => false,
        }
    }

    /// Move the pending target into the deleting phase and hand it out.
    pub fn begin_confirm(&mut self) -> Result<DeleteTarget, DeleteError> {
        match std::mem::take(&mut self.phase) {
            Phase::ConfirmPending(target) => {
                self.phase = Phase::Deleting(target.clone());
                Ok(target)
            }
            Phase::Deleting(target) => {
                self.phase = Phase::Deleting(target);
                Err(DeleteError::Busy)
            }
            Phase::Idle => Err(DeleteError::NothingPending),
        }
    }

    /// Return to idle after a batch, whatever its outcome.
    pub fn finish(&mut self) {
        self.phase = Phase::Idle;
    }

    /// Confirm the pending target and run it to completion.
    pub async fn confirm<D: DocumentDeleter>(
        &mut self,
        deleter: &D,
    ) -> Result<DeleteReport, DeleteError> {
        let target = self.begin_confirm()?;
        let report = Self::execute(deleter, &target.doc_ids()).await;
        self.finish();
        Ok(report)
    }

    /// Delete `ids` one at a time, awaiting each call before the next.
    ///
    /// Failures are logged and recorded; the remaining ids are still tried.
    pub async fn execute<D: DocumentDeleter>(deleter: &D, ids: &[DocumentId]) -> DeleteReport {
        let mut report = DeleteReport { requested: ids.len(), ..DeleteReport::default() };

        for &id in ids {
            match deleter.delete_document(id).await {
                Ok(()) => report.deleted.push(id),
                Err(e) => {
                    warn!(doc_id = id, error = %e, "failed to delete document");
                    report.failed.push(id);
                }
            }
        }

        info!(
            requested = report.requested,
            deleted = report.deleted.len(),
            failed = report.failed.len(),
            "delete batch finished"
        );
        report
    }
}
