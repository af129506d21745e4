//! Unified server error type.
//!
//! Every handler returns `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`] so errors are automatically converted
//! to a `{"error": "..."}` JSON body with an appropriate status code.
//!
//! Validation failures carry a user-facing message and are raised before any
//! backend call. Backend failures keep the backend's own message when it sent
//! one; transport and internal failures are logged in full but only a
//! generic message reaches the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use mango_core::DeleteError;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::backend::BackendError;

pub const BACKEND_UNREACHABLE: &str = "Falha ao conectar com o serviço de backend";
pub const BACKEND_INVALID_REPLY: &str = "Resposta inválida do serviço de backend";

/// All errors that can occur in the mango-server request lifecycle.
#[derive(Debug, Error)]
pub enum ServerError {
    /// A call to the knowledge-base backend failed.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// The delete coordinator refused a transition.
    #[error("delete error: {0}")]
    Delete(#[from] DeleteError),

    /// The caller referenced a resource that does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The caller sent an invalid or malformed request.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// An upload exceeded the configured size limit.
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),

    /// Missing or wrong admin credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// A server-side failure whose details stay in the logs.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, client_message) = match &self {
            // Client-facing errors: expose the message directly.
            ServerError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
            ServerError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
            ServerError::PayloadTooLarge(m) => (StatusCode::PAYLOAD_TOO_LARGE, m.clone()),
            ServerError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, m.clone()),

            ServerError::Delete(e) => {
                let status = match e {
                    DeleteError::Busy => StatusCode::CONFLICT,
                    DeleteError::NothingPending | DeleteError::EmptyGroup(_) => {
                        StatusCode::BAD_REQUEST
                    }
                };
                (status, e.to_string())
            }

            ServerError::Backend(e) => backend_response(e),

            ServerError::Internal(m) => {
                error!(message = %m, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_owned(),
                )
            }
        };
        (status, Json(json!({ "error": client_message }))).into_response()
    }
}

fn backend_response(e: &BackendError) -> (StatusCode, String) {
    match e {
        BackendError::Status { .. } | BackendError::Reported { .. } => {
            warn!(error = %e, "backend rejected request");
            let message = e.backend_message().map(str::to_owned).unwrap_or_else(|| {
                if let BackendError::Status { status, .. } = e {
                    format!("O serviço de backend respondeu com status {status}")
                } else {
                    BACKEND_UNREACHABLE.to_owned()
                }
            });
            (StatusCode::BAD_GATEWAY, message)
        }
        BackendError::Transport(_) => {
            error!(error = %e, "backend unreachable");
            (StatusCode::BAD_GATEWAY, BACKEND_UNREACHABLE.to_owned())
        }
        BackendError::Decode(_) | BackendError::Malformed(_) => {
            error!(error = %e, "backend reply could not be used");
            (StatusCode::BAD_GATEWAY, BACKEND_INVALID_REPLY.to_owned())
        }
        BackendError::InvalidUrl(_) => {
            error!(error = %e, "backend URL misconfigured");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".to_owned(),
            )
        }
    }
}

impl From<validator::ValidationErrors> for ServerError {
    fn from(errors: validator::ValidationErrors) -> Self {
        // Prefer the hand-written messages attached to the field rules.
        let message = errors
            .field_errors()
            .values()
            .flat_map(|errs| errs.iter())
            .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .unwrap_or_else(|| errors.to_string());
        ServerError::BadRequest(message)
    }
}
