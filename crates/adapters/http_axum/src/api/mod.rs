//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod events;
#[allow(clippy::missing_errors_doc)]
pub mod history;
pub mod sse;
pub mod stats;
#[allow(clippy::missing_errors_doc)]
pub mod triggers;
#[allow(clippy::missing_errors_doc)]
pub mod workflows;

use axum::Router;
use axum::routing::{get, post, put};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Triggers
        .route("/triggers", get(triggers::list).post(triggers::create))
        .route("/triggers/{id}", get(triggers::get).delete(triggers::delete))
        .route("/triggers/{id}/enabled", put(triggers::set_enabled))
        // Events
        .route("/events/{name}", post(events::publish))
        .route("/events/{name}/dispatch", post(events::dispatch))
        // History
        .route("/history", get(history::list).delete(history::clear))
        .route("/history/stream", get(sse::stream))
        // Stats
        .route("/stats", get(stats::get))
        // Workflows
        .route("/workflows/validate", post(workflows::validate))
}
