//! Handlers for the workflow state machine.
//!
//! Every handler takes the workflow lock for the duration of its call, so
//! mutations are applied one at a time in arrival order. Generation is the
//! exception: the handler only submits the request and a background task
//! applies the outcome once the bridge resolves it.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use cardsmith_core::card::CardStatus;
use cardsmith_core::types::DeckId;
use cardsmith_pipeline::WorkflowSnapshot;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateBody {
    #[serde(default)]
    pub source_name: String,
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationStarted {
    pub request_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub status: CardStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitBody {
    #[serde(alias = "targetContainerId")]
    pub deck_id: DeckId,
    #[serde(default)]
    pub additional_tags: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeResponse {
    pub resumed: bool,
    pub workflow: WorkflowSnapshot,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/workflow
pub async fn get_workflow(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let workflow = state.workflow.lock().await;
    Ok(Json(DataResponse {
        data: workflow.snapshot(),
    }))
}

/// POST /api/v1/workflow/resume
///
/// Load the saved session, if any, into review.
pub async fn resume(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let mut workflow = state.workflow.lock().await;
    let resumed = workflow.resume().await?;

    Ok(Json(DataResponse {
        data: ResumeResponse {
            resumed,
            workflow: workflow.snapshot(),
        },
    }))
}

/// POST /api/v1/workflow/generate
///
/// Submit source text for generation. Returns 202 with the request id;
/// poll `GET /workflow` for the result.
pub async fn generate(
    State(state): State<AppState>,
    Json(input): Json<GenerateBody>,
) -> AppResult<impl IntoResponse> {
    let pending = {
        let mut workflow = state.workflow.lock().await;
        workflow.begin_generation(input.source_name, input.text).await?
    };
    let request_id = pending.request_id;

    let workflow = Arc::clone(&state.workflow);
    tokio::spawn(async move {
        let outcome = pending.outcome().await;
        let mut workflow = workflow.lock().await;
        if let Err(e) = workflow.finish_generation(request_id, outcome) {
            tracing::info!(%request_id, error = %e, "Generation ended without cards");
        }
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(DataResponse {
            data: GenerationStarted { request_id },
        }),
    ))
}

/// PUT /api/v1/workflow/cards/{id}/status
pub async fn set_card_status(
    State(state): State<AppState>,
    Path(card_id): Path<String>,
    Json(input): Json<StatusBody>,
) -> AppResult<impl IntoResponse> {
    let mut workflow = state.workflow.lock().await;
    workflow.set_card_status(&card_id, input.status)?;

    tracing::debug!(%card_id, status = %input.status, "Card status updated");

    Ok(Json(DataResponse {
        data: workflow.snapshot(),
    }))
}

/// PUT /api/v1/workflow/cards/status
///
/// Approve-all / reject-all / reset-all.
pub async fn set_all_statuses(
    State(state): State<AppState>,
    Json(input): Json<StatusBody>,
) -> AppResult<impl IntoResponse> {
    let mut workflow = state.workflow.lock().await;
    workflow.set_all_statuses(input.status)?;

    Ok(Json(DataResponse {
        data: workflow.snapshot(),
    }))
}

/// POST /api/v1/workflow/commit
///
/// Import the approved cards into `deckId`. On a batch-fatal failure the
/// workflow returns to review with the session intact.
pub async fn commit(
    State(state): State<AppState>,
    Json(input): Json<CommitBody>,
) -> AppResult<impl IntoResponse> {
    let mut workflow = state.workflow.lock().await;
    let result = workflow.commit(input.deck_id, input.additional_tags).await?;

    Ok(Json(DataResponse { data: result }))
}

/// POST /api/v1/workflow/reset
pub async fn reset(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let mut workflow = state.workflow.lock().await;
    workflow.reset();

    Ok(Json(DataResponse {
        data: workflow.snapshot(),
    }))
}
