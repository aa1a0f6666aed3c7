//! Route definitions for the generate → review → import workflow.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::workflow;
use crate::state::AppState;

/// Workflow routes mounted at `/workflow`.
///
/// ```text
/// GET    /                      -> get_workflow
/// POST   /resume                -> resume
/// POST   /generate              -> generate
/// PUT    /cards/status          -> set_all_statuses
/// PUT    /cards/{id}/status     -> set_card_status
/// POST   /commit                -> commit
/// POST   /reset                 -> reset
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(workflow::get_workflow))
        .route("/resume", post(workflow::resume))
        .route("/generate", post(workflow::generate))
        .route("/cards/status", put(workflow::set_all_statuses))
        .route("/cards/{id}/status", put(workflow::set_card_status))
        .route("/commit", post(workflow::commit))
        .route("/reset", post(workflow::reset))
}
