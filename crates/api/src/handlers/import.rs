use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use cardsmith_core::import::ImportRequest;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/import
///
/// Import the approved cards of the request directly, without going
/// through the workflow. Cards with any other status are skipped.
pub async fn import_approved_cards(
    State(state): State<AppState>,
    Json(input): Json<ImportRequest>,
) -> AppResult<impl IntoResponse> {
    let result = state.importer.import_approved(&input).await?;

    Ok(Json(DataResponse { data: result }))
}
