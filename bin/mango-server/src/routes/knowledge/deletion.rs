//! Confirm-then-delete flow for the console's delete buttons.
//!
//! A request parks a snapshot of what will be deleted in the shared
//! [`DeleteCoordinator`]; confirm deletes those ids one at a time; cancel
//! drops the snapshot without touching the store. The coordinator lock is
//! released while the backend calls run, and requests that arrive meanwhile
//! get 409.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use mango_core::{
    find_group, group, ConfirmationPrompt, DeleteCoordinator, DeleteKind, DeleteModalState,
    DeleteReport, DeleteTarget, DocumentId, GroupData,
};
use tracing::{info, warn};
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::schemas::knowledge::{DeleteConfirmation, DeleteRequest};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(deletion_state, request_deletion, confirm_deletion, cancel_deletion),
    components(schemas(
        DeleteRequest,
        DeleteConfirmation,
        DeleteModalState,
        DeleteReport,
        DeleteKind,
        ConfirmationPrompt,
        GroupData,
    ))
)]
pub struct DeletionApi;

#[utoipa::path(
    get,
    path = "/api/admin/deletion",
    tag = "knowledge",
    responses(
        (status = 200, description = "Current confirmation prompt", body = DeleteModalState),
        (status = 401, description = "No admin session"),
    )
)]
pub async fn deletion_state(State(state): State<Arc<AppState>>) -> Json<DeleteModalState> {
    Json(state.deletions.lock().await.modal_state())
}

/// Ask to delete one chunk or a whole source (`POST /api/admin/deletion`).
///
/// Replaces any prompt still waiting for confirmation.
#[utoipa::path(
    post,
    path = "/api/admin/deletion",
    tag = "knowledge",
    request_body = DeleteRequest,
    responses(
        (status = 200, description = "Prompt opened", body = DeleteModalState),
        (status = 401, description = "No admin session"),
        (status = 404, description = "Unknown document or group"),
        (status = 409, description = "A delete batch is running"),
    )
)]
pub async fn request_deletion(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DeleteRequest>,
) -> Result<Json<DeleteModalState>, ServerError> {
    // Fail fast instead of listing documents for a request that will be refused.
    if state.deletions.lock().await.is_deleting() {
        return Err(mango_core::DeleteError::Busy.into());
    }

    // An outage must not read as "no such document".
    let documents = state.backend.fetch_documents().await?;
    let target = match req {
        DeleteRequest::Single { doc_id } => {
            if !documents.iter().any(|d| d.id == doc_id) {
                return Err(ServerError::NotFound(format!("documento {doc_id} não encontrado")));
            }
            DeleteTarget::single(doc_id)
        }
        DeleteRequest::Group { group_key } => {
            let groups = group(&documents);
            let source = find_group(&groups, &group_key).ok_or_else(|| {
                ServerError::NotFound(format!("fonte '{group_key}' não encontrada"))
            })?;
            DeleteTarget::group(source)?
        }
    };

    let modal = state.deletions.lock().await.request_delete(target)?;
    Ok(Json(modal))
}

/// Run the pending delete (`POST /api/admin/deletion/confirm`).
///
/// Individual failures do not fail the request; they are listed in the
/// report and the prompt closes either way.
#[utoipa::path(
    post,
    path = "/api/admin/deletion/confirm",
    tag = "knowledge",
    responses(
        (status = 200, description = "Batch finished", body = DeleteConfirmation),
        (status = 400, description = "Nothing pending"),
        (status = 401, description = "No admin session"),
        (status = 409, description = "A delete batch is already running"),
    )
)]
pub async fn confirm_deletion(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DeleteConfirmation>, ServerError> {
    let target = state.deletions.lock().await.begin_confirm()?;

    // The batch owns the return to Idle, so a client that disconnects
    // mid-batch cannot leave the coordinator in Deleting.
    let batch = tokio::spawn(run_batch(state.clone(), target.doc_ids()));
    let (report, modal) = match batch.await {
        Ok(done) => done,
        Err(e) => {
            state.deletions.lock().await.finish();
            return Err(ServerError::Internal(format!("delete batch aborted: {e}")));
        }
    };

    if !report.is_complete() {
        warn!(failed = ?report.failed, "delete batch finished with failures");
    }
    info!(kind = ?target.kind(), deleted = report.deleted.len(), "delete confirmed");

    Ok(Json(DeleteConfirmation {
        message: outcome_message(&report),
        report,
        state: modal,
    }))
}

/// Dismiss the pending prompt (`POST /api/admin/deletion/cancel`).
///
/// A no-op when nothing is pending; a running batch is not interrupted.
#[utoipa::path(
    post,
    path = "/api/admin/deletion/cancel",
    tag = "knowledge",
    responses(
        (status = 200, description = "Prompt state after cancelling", body = DeleteModalState),
        (status = 401, description = "No admin session"),
    )
)]
pub async fn cancel_deletion(State(state): State<Arc<AppState>>) -> Json<DeleteModalState> {
    let mut deletions = state.deletions.lock().await;
    deletions.cancel();
    Json(deletions.modal_state())
}

/// Delete `ids` and return the coordinator to Idle, whatever happened.
async fn run_batch(state: Arc<AppState>, ids: Vec<DocumentId>) -> (DeleteReport, DeleteModalState) {
    let report = DeleteCoordinator::execute(&*state.backend, &ids).await;
    let mut deletions = state.deletions.lock().await;
    deletions.finish();
    (report, deletions.modal_state())
}

fn outcome_message(report: &DeleteReport) -> String {
    match (report.requested, report.failed.len()) {
        (1, 0) => "Documento excluído com sucesso!".to_owned(),
        (n, 0) => format!("{n} documentos excluídos com sucesso!"),
        (n, failed) => format!(
            "{} de {n} documentos excluídos; {failed} falharam.",
            report.deleted.len()
        ),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_support::*;
    use axum::http::StatusCode;
    use serde_json::json;
    use std::time::Duration;
    use tower::ServiceExt;
    use tracing_test::traced_test;

    fn request(body: serde_json::Value) -> axum::http::Request<axum::body::Body> {
        admin_json_request("POST", "/api/admin/deletion", body)
    }

    fn confirm() -> axum::http::Request<axum::body::Body> {
        admin_json_request("POST", "/api/admin/deletion/confirm", json!({}))
    }

    #[tokio::test]
    async fn group_delete_issues_one_call_per_chunk() {
        let fake = FakeBackend::spawn(FakeBackend::sample_documents()).await;
        let app = test_app(&fake.url());

        let resp = app
            .clone()
            .oneshot(request(json!({ "type": "group", "group_key": "https://www.ifpe.br/cursos" })))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let modal = body_json(resp).await;
        assert_eq!(modal["is_open"], true);
        assert_eq!(modal["type"], "group");
        assert_eq!(modal["group_data"]["doc_ids"], json!([1, 2]));
        assert!(fake.deleted_ids().is_empty());

        let resp = app.clone().oneshot(confirm()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["message"], "2 documentos excluídos com sucesso!");
        assert_eq!(body["state"]["is_open"], false);
        assert_eq!(fake.deleted_ids(), vec![vec![1], vec![2]]);
    }

    #[tokio::test]
    #[traced_test]
    async fn failed_chunk_is_reported_and_prompt_closes() {
        let fake = FakeBackend::spawn(FakeBackend::sample_documents()).await;
        fake.fail_delete(1);
        let app = test_app(&fake.url());

        app.clone()
            .oneshot(request(json!({ "type": "group", "group_key": "https://www.ifpe.br/cursos" })))
            .await
            .unwrap();
        let resp = app.clone().oneshot(confirm()).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["report"]["deleted"], json!([2]));
        assert_eq!(body["report"]["failed"], json!([1]));
        assert_eq!(body["message"], "1 de 2 documentos excluídos; 1 falharam.");
        assert!(logs_contain("delete batch finished with failures"));

        let resp = app.oneshot(admin_get("/api/admin/deletion")).await.unwrap();
        assert_eq!(body_json(resp).await["is_open"], false);
    }

    #[tokio::test]
    async fn cancel_makes_no_backend_calls() {
        let fake = FakeBackend::spawn(FakeBackend::sample_documents()).await;
        let app = test_app(&fake.url());

        app.clone().oneshot(request(json!({ "type": "single", "doc_id": 4 }))).await.unwrap();
        let resp = app
            .clone()
            .oneshot(admin_json_request("POST", "/api/admin/deletion/cancel", json!({})))
            .await
            .unwrap();
        assert_eq!(body_json(resp).await["is_open"], false);

        let resp = app.oneshot(confirm()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(fake.deleted_ids().is_empty());
    }

    #[tokio::test]
    async fn pending_target_is_a_snapshot() {
        let fake = FakeBackend::spawn(FakeBackend::sample_documents()).await;
        let app = test_app(&fake.url());

        app.clone()
            .oneshot(request(json!({ "type": "group", "group_key": "https://www.ifpe.br/cursos" })))
            .await
            .unwrap();
        fake.remove_documents(&[2]);
        app.oneshot(confirm()).await.unwrap();

        assert_eq!(fake.deleted_ids(), vec![vec![1], vec![2]]);
    }

    #[tokio::test]
    async fn unknown_targets_are_not_found() {
        let fake = FakeBackend::spawn(FakeBackend::sample_documents()).await;
        let app = test_app(&fake.url());

        let resp = app
            .clone()
            .oneshot(request(json!({ "type": "group", "group_key": "https://outro.site" })))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = app.oneshot(request(json!({ "type": "single", "doc_id": 99 }))).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn requests_during_a_batch_conflict() {
        let fake = FakeBackend::spawn(FakeBackend::sample_documents()).await;
        let state = test_state(&fake.url());
        {
            let mut deletions = state.deletions.lock().await;
            deletions.request_delete(DeleteTarget::single(4)).unwrap();
            deletions.begin_confirm().unwrap();
        }
        let app = crate::routes::build(state);

        let resp = app
            .clone()
            .oneshot(request(json!({ "type": "single", "doc_id": 3 })))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let resp = app.oneshot(confirm()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert!(fake.deleted_ids().is_empty());
    }

    #[tokio::test]
    async fn dropped_confirm_still_returns_to_idle() {
        let (url, release) = stalled_url().await;
        let state = test_state(&url);
        state.deletions.lock().await.request_delete(DeleteTarget::single(1)).unwrap();

        let dropped = tokio::time::timeout(
            Duration::from_millis(200),
            confirm_deletion(State(state.clone())),
        )
        .await;
        assert!(dropped.is_err());
        assert!(state.deletions.lock().await.is_deleting());

        // Closing the stalled connection fails the delete; the batch must
        // still close the prompt on its own.
        release.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(5), async {
            while !state.deletions.lock().await.is_idle() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();

        let Json(modal) = deletion_state(State(state.clone())).await;
        assert!(!modal.is_open);
        assert!(!modal.in_progress);
        let reopened = state.deletions.lock().await.request_delete(DeleteTarget::single(2));
        assert!(reopened.is_ok());
    }

    #[tokio::test]
    async fn listing_outage_is_not_a_missing_document() {
        let fake = FakeBackend::spawn(FakeBackend::sample_documents()).await;
        fake.fail_listing();
        let app = test_app(&fake.url());

        let resp = app.oneshot(request(json!({ "type": "single", "doc_id": 3 }))).await.unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(body_json(resp).await["error"], "indisponível");
    }

    #[test]
    fn outcome_messages() {
        let report = |requested, deleted: Vec<i64>, failed: Vec<i64>| DeleteReport { requested, deleted, failed };
        assert_eq!(outcome_message(&report(1, vec![4], vec![])), "Documento excluído com sucesso!");
        assert_eq!(outcome_message(&report(3, vec![1, 2, 3], vec![])), "3 documentos excluídos com sucesso!");
        assert_eq!(outcome_message(&report(2, vec![], vec![1, 2])), "0 de 2 documentos excluídos; 2 falharam.");
    }
}
