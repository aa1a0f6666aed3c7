use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use cardsmith_bridge::CompletionEnvelope;
use serde::Serialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CompletionAck {
    /// `false` when the request had already resolved or was never issued.
    pub accepted: bool,
}

/// POST /api/v1/bridge/completions
///
/// Out-of-band completion from the generation worker. Late or unknown
/// completions are acknowledged and dropped.
pub async fn receive_completion(
    State(state): State<AppState>,
    Json(envelope): Json<CompletionEnvelope>,
) -> AppResult<impl IntoResponse> {
    let request_id = envelope.request_id;
    let accepted = state.bridge.complete(envelope);

    if accepted {
        tracing::info!(%request_id, "Generation completion received");
    } else {
        tracing::info!(%request_id, "Dropping completion for request that is not pending");
    }

    Ok(Json(DataResponse {
        data: CompletionAck { accepted },
    }))
}
