use axum::routing::post;
use axum::Router;

use crate::handlers::bridge;
use crate::state::AppState;

/// Generation worker callback routes mounted at `/bridge`.
///
/// ```text
/// POST   /completions    -> receive_completion
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/completions", post(bridge::receive_completion))
}
