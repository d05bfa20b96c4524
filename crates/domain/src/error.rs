//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`TriggerHubError`] via `#[from]`.

use crate::id::TriggerId;

/// Top-level error returned by registration, query and build operations.
#[derive(Debug, thiserror::Error)]
pub enum TriggerHubError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    #[error("conflict")]
    Conflict(#[from] ConflictError),

    #[error("invalid workflow")]
    Workflow(#[from] WorkflowError),
}

/// A domain invariant was violated by caller-supplied data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("event name must not be empty")]
    EmptyEventName,

    #[error("trigger id must not be empty")]
    EmptyTriggerId,

    #[error("action type must not be empty")]
    EmptyActionType,
}

/// The requested resource does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} `{id}` not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// A uniqueness constraint would be broken by the operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConflictError {
    #[error("trigger `{0}` is already registered")]
    DuplicateTrigger(TriggerId),

    #[error("action handler `{0}` is already registered")]
    DuplicateHandler(String),
}

/// Structural problems found while building a workflow.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    #[error("workflow name is required")]
    MissingName,

    #[error("workflow must contain at least one step")]
    NoSteps,

    #[error("duplicate step ids: {}", .0.join(", "))]
    DuplicateStepIds(Vec<String>),

    #[error("step `{step}` depends on unknown step `{dependency}`")]
    MissingDependency { step: String, dependency: String },

    #[error("circular dependency detected at step `{step}`")]
    CircularDependency { step: String },
}

/// Failure of a single action during dispatch.
///
/// These never escape the engine: they are rendered into the `errors`
/// list of the matching execution result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("no handler registered for action type `{0}`")]
    UnregisteredHandler(String),

    #[error("invalid action parameters: {0}")]
    InvalidParams(String),

    #[error("condition evaluation failed: {0}")]
    Condition(String),

    #[error("action timed out after {0} ms")]
    TimedOut(u64),

    #[error("{0}")]
    Failed(String),
}

impl ActionError {
    /// Build a generic handler failure from any displayable message.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}
