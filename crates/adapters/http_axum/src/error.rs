//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use triggerhub_domain::error::TriggerHubError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps domain failures and malformed requests to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    Domain(TriggerHubError),
    /// Request body that is not valid JSON for the endpoint.
    InvalidBody(String),
}

impl From<TriggerHubError> for ApiError {
    fn from(err: TriggerHubError) -> Self {
        Self::Domain(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Domain(TriggerHubError::Validation(err)) => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            Self::Domain(TriggerHubError::Workflow(err)) => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            Self::Domain(TriggerHubError::NotFound(err)) => (StatusCode::NOT_FOUND, err.to_string()),
            Self::Domain(TriggerHubError::Conflict(err)) => (StatusCode::CONFLICT, err.to_string()),
            Self::InvalidBody(message) => (StatusCode::BAD_REQUEST, message.clone()),
        };

        if status.is_client_error() {
            tracing::debug!(%status, error = %message, "request rejected");
        }

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
