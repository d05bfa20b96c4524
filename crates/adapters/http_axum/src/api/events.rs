//! Event publication handlers.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use triggerhub_app::ports::EventPublisher;
use triggerhub_domain::automation::ExecutionResult;
use triggerhub_domain::event::{Event, Payload};

use crate::error::ApiError;
use crate::state::AppState;

/// Acknowledgement for a fire-and-forget publication.
#[derive(Serialize)]
pub struct Accepted {
    pub event: String,
}

/// Possible responses from the publish endpoint.
pub enum PublishResponse {
    Accepted(Json<Accepted>),
}

impl IntoResponse for PublishResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Accepted(json) => (StatusCode::ACCEPTED, json).into_response(),
        }
    }
}

/// Possible responses from the dispatch endpoint.
pub enum DispatchResponse {
    Ok(Json<Vec<ExecutionResult>>),
}

impl IntoResponse for DispatchResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// An empty body is an empty object payload.
fn parse_payload(body: &Bytes) -> Result<Payload, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Payload::empty());
    }
    serde_json::from_slice::<serde_json::Value>(body)
        .map(Payload::new)
        .map_err(|err| ApiError::InvalidBody(format!("invalid event payload: {err}")))
}

/// `POST /api/events/{name}`: publish an event and return immediately.
pub async fn publish(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<PublishResponse, ApiError> {
    let payload = parse_payload(&body)?;
    state
        .engine
        .publish(Event::new(name.clone(), payload))
        .await?;
    Ok(PublishResponse::Accepted(Json(Accepted { event: name })))
}

/// `POST /api/events/{name}/dispatch`: process an event and return the
/// execution results it produced.
pub async fn dispatch(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<DispatchResponse, ApiError> {
    let payload = parse_payload(&body)?;
    let results = state.engine.dispatch(name, payload).await;
    Ok(DispatchResponse::Ok(Json(results)))
}
