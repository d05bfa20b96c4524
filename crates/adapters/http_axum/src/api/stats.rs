//! Engine statistics handler.

use axum::Json;
use axum::extract::State;

use triggerhub_app::automation_engine::EngineStats;

use crate::state::AppState;

/// `GET /api/stats`: trigger, execution and handler counters.
pub async fn get(State(state): State<AppState>) -> Json<EngineStats> {
    Json(state.engine.stats().await)
}
