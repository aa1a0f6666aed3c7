use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cardsmith_core::error::CoreError;
use cardsmith_pipeline::{ImportError, WorkflowError};
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps the domain errors of the lower crates and adds HTTP-specific
/// variants. Implements [`IntoResponse`] to produce consistent JSON error
/// responses of the form `{"error": ..., "code": ...}`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => classify_core_error(core),
            AppError::Workflow(err) => classify_workflow_error(err),
            AppError::Import(err) => classify_import_error(err),
            AppError::Database(err) => {
                tracing::error!(error = %err, "Database error");
                internal()
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

fn classify_core_error(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string()),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::UnknownVariant { .. } => {
            (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.to_string())
        }
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            internal()
        }
    }
}

fn classify_workflow_error(err: &WorkflowError) -> (StatusCode, &'static str, String) {
    match err {
        WorkflowError::EmptySource | WorkflowError::NothingApproved => {
            (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.to_string())
        }
        WorkflowError::CardNotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string()),
        WorkflowError::GenerationInProgress => {
            (StatusCode::CONFLICT, "GENERATION_IN_PROGRESS", err.to_string())
        }
        WorkflowError::InvalidState { .. } => {
            (StatusCode::CONFLICT, "INVALID_STATE", err.to_string())
        }
        WorkflowError::Generation(_) => {
            (StatusCode::BAD_GATEWAY, "GENERATION_FAILED", err.to_string())
        }
        WorkflowError::Import(import) => classify_import_error(import),
    }
}

/// Both batch-fatal import failures come from the collection side.
fn classify_import_error(err: &ImportError) -> (StatusCode, &'static str, String) {
    (StatusCode::BAD_GATEWAY, "IMPORT_FAILED", err.to_string())
}
