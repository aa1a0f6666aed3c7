//! Session snapshot RPCs.
//!
//! Persistence failures are never reported as errors here: a failed load
//! reads as "no session" and a failed save is logged and answered with
//! `saved: false`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use cardsmith_core::card::Card;
use cardsmith_core::session::Session;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadSessionResponse {
    pub has_session: bool,
    pub cards: Vec<Card>,
    pub source_name: String,
    pub source_text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSessionBody {
    #[serde(default)]
    pub source_name: String,
    #[serde(default)]
    pub source_text: String,
    pub cards: Vec<Card>,
}

#[derive(Debug, Serialize)]
pub struct SaveSessionResponse {
    pub saved: bool,
}

/// GET /api/v1/session
pub async fn load_session(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let data = match state.sessions.load().await {
        Some(session) => LoadSessionResponse {
            has_session: true,
            cards: session.cards,
            source_name: session.source_name,
            source_text: session.source_text,
        },
        None => LoadSessionResponse {
            has_session: false,
            cards: Vec::new(),
            source_name: String::new(),
            source_text: String::new(),
        },
    };

    Ok(Json(DataResponse { data }))
}

/// PUT /api/v1/session
///
/// Overwrite the snapshot. Re-saving the same source keeps its original
/// creation time so the retention window is not extended.
pub async fn save_session(
    State(state): State<AppState>,
    Json(input): Json<SaveSessionBody>,
) -> AppResult<impl IntoResponse> {
    let created_at = state
        .sessions
        .load()
        .await
        .filter(|s| s.source_name == input.source_name && s.source_text == input.source_text)
        .map(|s| s.created_at);

    let session = match created_at {
        Some(created_at) => {
            Session::created_at(input.source_name, input.source_text, input.cards, created_at)
        }
        None => Session::new(input.source_name, input.source_text, input.cards),
    };

    let saved = match state.sessions.save(&session).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to save session");
            false
        }
    };

    Ok(Json(DataResponse {
        data: SaveSessionResponse { saved },
    }))
}

/// DELETE /api/v1/session
pub async fn clear_session(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    if let Err(e) = state.sessions.clear().await {
        tracing::warn!(error = %e, "Failed to clear session");
    }

    Ok(StatusCode::NO_CONTENT)
}
