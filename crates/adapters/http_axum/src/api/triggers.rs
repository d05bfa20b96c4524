//! JSON REST handlers for triggers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use triggerhub_domain::automation::{Action, Trigger, TriggerOptions};
use triggerhub_domain::id::TriggerId;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for registering a trigger.
#[derive(Deserialize)]
pub struct CreateTriggerRequest {
    pub event: String,
    #[serde(default)]
    pub actions: Vec<Action>,
    pub id: Option<TriggerId>,
    pub description: Option<String>,
    pub enabled: Option<bool>,
}

/// Request body for enabling or disabling a trigger.
#[derive(Deserialize)]
pub struct SetEnabledRequest {
    pub enabled: bool,
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<Trigger>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get and set-enabled endpoints.
pub enum GetResponse {
    Ok(Json<Trigger>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Json<Trigger>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from the delete endpoint.
pub enum DeleteResponse {
    NoContent,
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// `GET /api/triggers`: list triggers in registration order.
pub async fn list(State(state): State<AppState>) -> ListResponse {
    ListResponse::Ok(Json(state.engine.triggers().await))
}

/// `GET /api/triggers/{id}`: get one trigger.
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<GetResponse, ApiError> {
    let trigger = state.engine.trigger(&TriggerId::from(id)).await?;
    Ok(GetResponse::Ok(Json(trigger)))
}

/// `POST /api/triggers`: register a trigger.
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateTriggerRequest>,
) -> Result<CreateResponse, ApiError> {
    let options = TriggerOptions {
        id: req.id,
        description: req.description,
        enabled: req.enabled,
    };
    let id = state
        .engine
        .register_trigger(req.event, req.actions, options)
        .await?;
    let trigger = state.engine.trigger(&id).await?;
    Ok(CreateResponse::Created(Json(trigger)))
}

/// `DELETE /api/triggers/{id}`: unregister a trigger.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<DeleteResponse, ApiError> {
    state.engine.unregister_trigger(&TriggerId::from(id)).await?;
    Ok(DeleteResponse::NoContent)
}

/// `PUT /api/triggers/{id}/enabled`: enable or disable a trigger.
pub async fn set_enabled(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SetEnabledRequest>,
) -> Result<GetResponse, ApiError> {
    let trigger = state
        .engine
        .set_trigger_enabled(&TriggerId::from(id), req.enabled)
        .await?;
    Ok(GetResponse::Ok(Json(trigger)))
}
