pub mod bridge;
pub mod decks;
pub mod health;
pub mod import;
pub mod session;
pub mod workflow;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /workflow                                        snapshot (GET)
/// /workflow/resume                                 resume saved session (POST)
/// /workflow/generate                               start generation (POST, 202)
/// /workflow/cards/status                           bulk-set status (PUT)
/// /workflow/cards/{id}/status                      set one card's status (PUT)
/// /workflow/commit                                 import approved cards (POST)
/// /workflow/reset                                  start a new session (POST)
///
/// /session                                         load, save, clear (GET, PUT, DELETE)
///
/// /import                                          import approved cards (POST)
///
/// /decks                                           list target decks (GET)
///
/// /bridge/completions                              generation completion (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/workflow", workflow::router())
        .nest("/session", session::router())
        .nest("/import", import::router())
        .nest("/decks", decks::router())
        .nest("/bridge", bridge::router())
}
