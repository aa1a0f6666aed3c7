use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use cardsmith_db::repositories::DeckRepo;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/decks
///
/// Decks available as import targets, sorted by name.
pub async fn list_decks(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let decks = DeckRepo::list(&state.pool).await?;

    Ok(Json(DataResponse { data: decks }))
}
