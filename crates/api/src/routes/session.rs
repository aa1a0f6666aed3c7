use axum::routing::get;
use axum::Router;

use crate::handlers::session;
use crate::state::AppState;

/// Session snapshot routes mounted at `/session`.
///
/// ```text
/// GET    /    -> load_session
/// PUT    /    -> save_session
/// DELETE /    -> clear_session
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/",
        get(session::load_session)
            .put(session::save_session)
            .delete(session::clear_session),
    )
}
