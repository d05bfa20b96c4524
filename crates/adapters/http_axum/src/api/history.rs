//! Execution history handlers.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use triggerhub_domain::automation::ExecutionResult;

use crate::state::AppState;

/// Query parameters for the history listing.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    /// Newest entries to return; defaults to 100.
    pub limit: Option<usize>,
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<ExecutionResult>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the clear endpoint.
pub enum ClearResponse {
    NoContent,
}

impl IntoResponse for ClearResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// `GET /api/history?limit=N`: most recent execution results, oldest first.
pub async fn list(State(state): State<AppState>, Query(query): Query<HistoryQuery>) -> ListResponse {
    ListResponse::Ok(Json(state.engine.execution_history(query.limit).await))
}

/// `DELETE /api/history`: drop every retained result.
pub async fn clear(State(state): State<AppState>) -> ClearResponse {
    state.engine.clear_history().await;
    ClearResponse::NoContent
}
