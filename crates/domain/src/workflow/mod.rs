//! Workflow: a named graph of steps handed to an external executor.
//!
//! Definitions are assembled with [`WorkflowBuilder`] and checked by
//! [`validate_steps`] before they are considered buildable.

mod builder;
mod validate;

pub use builder::{DEFAULT_CATEGORY, DEFAULT_VERSION, WorkflowBuilder};
pub use validate::validate_steps;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Guard attached to a step, interpreted by the executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StepCondition {
    /// Run only when an earlier step failed (`{{error}}`).
    OnError,
    /// Run once the rest of the workflow completed (`{{completed}}`).
    OnCompleted,
    /// Free-form executor expression.
    Expression(String),
}

impl StepCondition {
    const ON_ERROR: &'static str = "{{error}}";
    const ON_COMPLETED: &'static str = "{{completed}}";

    /// The expression string understood by the executor.
    #[must_use]
    pub fn expression(&self) -> &str {
        match self {
            Self::OnError => Self::ON_ERROR,
            Self::OnCompleted => Self::ON_COMPLETED,
            Self::Expression(expr) => expr,
        }
    }
}

impl From<String> for StepCondition {
    fn from(value: String) -> Self {
        match value.as_str() {
            Self::ON_ERROR => Self::OnError,
            Self::ON_COMPLETED => Self::OnCompleted,
            _ => Self::Expression(value),
        }
    }
}

impl From<StepCondition> for String {
    fn from(value: StepCondition) -> Self {
        match value {
            StepCondition::Expression(expr) => expr,
            other => other.expression().to_string(),
        }
    }
}

impl fmt::Display for StepCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.expression())
    }
}

/// One unit of work inside a workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStep {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Step kind, opaque to this crate.
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub params: serde_json::Map<String, serde_json::Value>,
    /// Ids of steps that must complete before this one.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<StepCondition>,
    #[serde(default)]
    pub parallel: bool,
}

impl WorkflowStep {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            action: String::new(),
            params: serde_json::Map::new(),
            dependencies: Vec::new(),
            condition: None,
            parallel: false,
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = action.into();
        self
    }

    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn depends_on(mut self, step_id: impl Into<String>) -> Self {
        self.dependencies.push(step_id.into());
        self
    }

    #[must_use]
    pub fn condition(mut self, condition: StepCondition) -> Self {
        self.condition = Some(condition);
        self
    }

    #[must_use]
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Declared workflow-level input or output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IoDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required: bool,
}

impl IoDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            description: String::new(),
            required: false,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Capabilities a workflow needs or may use.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Permissions {
    pub required: Vec<String>,
    pub optional: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimits {
    pub max_executions_per_hour: u32,
    pub max_executions_per_day: u32,
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            max_executions_per_hour: 10,
            max_executions_per_day: 100,
        }
    }
}

/// What the executor does when a step fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    #[default]
    Retry,
    Skip,
    Abort,
    Continue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorHandling {
    pub on_failure: FailurePolicy,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

impl Default for ErrorHandling {
    fn default() -> Self {
        Self {
            on_failure: FailurePolicy::Retry,
            max_retries: 3,
            retry_delay_ms: 1000,
        }
    }
}

/// Complete, validated workflow ready for an executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub version: String,
    pub category: String,
    pub tags: Vec<String>,
    pub steps: Vec<WorkflowStep>,
    pub inputs: Vec<IoDescriptor>,
    pub outputs: Vec<IoDescriptor>,
    pub permissions: Permissions,
    pub rate_limits: RateLimits,
    pub error_handling: ErrorHandling,
}
