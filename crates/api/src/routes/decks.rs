use axum::routing::get;
use axum::Router;

use crate::handlers::decks;
use crate::state::AppState;

/// Deck routes mounted at `/decks`.
///
/// ```text
/// GET    /    -> list_decks
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(decks::list_decks))
}
