//! Workflow validation handler.

use axum::Json;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use triggerhub_domain::error::TriggerHubError;
use triggerhub_domain::workflow::{
    ErrorHandling, IoDescriptor, Permissions, RateLimits, WorkflowBuilder, WorkflowDefinition,
    WorkflowStep,
};

use crate::error::ApiError;

/// A workflow as submitted by a client. Unset fields get builder defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WorkflowDraft {
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub version: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub steps: Vec<WorkflowStep>,
    pub inputs: Vec<IoDescriptor>,
    pub outputs: Vec<IoDescriptor>,
    pub permissions: Option<Permissions>,
    pub rate_limits: Option<RateLimits>,
    pub error_handling: Option<ErrorHandling>,
}

impl WorkflowDraft {
    fn into_builder(self) -> WorkflowBuilder {
        let mut builder = WorkflowBuilder::new();
        if let Some(name) = self.name {
            builder.name(name);
        }
        if let Some(display_name) = self.display_name {
            builder.display_name(display_name);
        }
        if let Some(description) = self.description {
            builder.description(description);
        }
        if let Some(version) = self.version {
            builder.version(version);
        }
        if let Some(category) = self.category {
            builder.category(category);
        }
        if let Some(permissions) = self.permissions {
            builder.permissions(permissions);
        }
        if let Some(rate_limits) = self.rate_limits {
            builder.rate_limits(rate_limits);
        }
        if let Some(error_handling) = self.error_handling {
            builder.error_handling(error_handling);
        }
        for input in self.inputs {
            builder.input(input);
        }
        for output in self.outputs {
            builder.output(output);
        }
        builder.tags(self.tags).steps(self.steps);
        builder
    }
}

/// Possible responses from the validate endpoint.
pub enum ValidateResponse {
    Ok(Json<WorkflowDefinition>),
}

impl IntoResponse for ValidateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `POST /api/workflows/validate`: return the completed definition, or the
/// first structural problem found in the steps.
#[allow(clippy::unused_async)]
pub async fn validate(Json(draft): Json<WorkflowDraft>) -> Result<ValidateResponse, ApiError> {
    let definition = draft
        .into_builder()
        .definition()
        .map_err(TriggerHubError::from)?;
    Ok(ValidateResponse::Ok(Json(definition)))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use triggerhub_app::automation_engine::AutomationEngine;

    use crate::testing::{app, json_request, send};

    async fn validate(body: &serde_json::Value) -> (StatusCode, serde_json::Value) {
        send(
            app(&AutomationEngine::default()),
            json_request("POST", "/api/workflows/validate", body),
        )
        .await
    }

    #[tokio::test]
    async fn should_return_definition_with_defaults() {
        let (status, body) = validate(&json!({
            "name": "deploy",
            "steps": [
                {"id": "build", "action": "shell"},
                {"id": "test", "action": "shell", "dependencies": ["build"]},
                {"id": "page", "action": "notify", "condition": "{{error}}"}
            ]
        }))
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["display_name"], "deploy");
        assert_eq!(body["version"], "1.0.0");
        assert_eq!(body["category"], "general");
        assert_eq!(body["rate_limits"]["max_executions_per_hour"], 10);
        assert_eq!(body["error_handling"]["on_failure"], "retry");
        assert_eq!(body["steps"][2]["condition"], "{{error}}");
    }

    #[tokio::test]
    async fn should_reject_circular_dependencies() {
        let (status, body) = validate(&json!({
            "name": "loop",
            "steps": [
                {"id": "a", "action": "x", "dependencies": ["b"]},
                {"id": "b", "action": "x", "dependencies": ["a"]}
            ]
        }))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("circular dependency"));
    }

    #[tokio::test]
    async fn should_reject_missing_dependency() {
        let (status, body) = validate(&json!({
            "name": "w",
            "steps": [{"id": "a", "action": "x", "dependencies": ["ghost"]}]
        }))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("ghost"));
    }

    #[tokio::test]
    async fn should_reject_workflow_without_name_or_steps() {
        let (status, _) = validate(&json!({"steps": [{"id": "a", "action": "x"}]})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = validate(&json!({"name": "empty"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
