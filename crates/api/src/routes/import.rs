use axum::routing::post;
use axum::Router;

use crate::handlers::import;
use crate::state::AppState;

/// Import routes mounted at `/import`.
///
/// ```text
/// POST   /    -> import_approved_cards
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(import::import_approved_cards))
}
