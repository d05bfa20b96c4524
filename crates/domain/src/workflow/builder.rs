//! Reusable fluent builder for [`WorkflowDefinition`].

use crate::error::WorkflowError;

use super::{
    ErrorHandling, IoDescriptor, Permissions, RateLimits, StepCondition, WorkflowDefinition,
    WorkflowStep, validate_steps,
};

/// Version assigned when none is set.
pub const DEFAULT_VERSION: &str = "1.0.0";
/// Category assigned when none is set.
pub const DEFAULT_CATEGORY: &str = "general";

/// Step-by-step accumulator for a [`WorkflowDefinition`].
///
/// Setters take `&mut self` so one builder can assemble several workflows
/// with [`WorkflowBuilder::reset`] in between.
#[derive(Debug, Clone, Default)]
pub struct WorkflowBuilder {
    name: Option<String>,
    display_name: Option<String>,
    description: Option<String>,
    version: Option<String>,
    category: Option<String>,
    tags: Vec<String>,
    steps: Vec<WorkflowStep>,
    inputs: Vec<IoDescriptor>,
    outputs: Vec<IoDescriptor>,
    permissions: Permissions,
    rate_limits: RateLimits,
    error_handling: ErrorHandling,
}

impl WorkflowBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    pub fn display_name(&mut self, display_name: impl Into<String>) -> &mut Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn description(&mut self, description: impl Into<String>) -> &mut Self {
        self.description = Some(description.into());
        self
    }

    pub fn version(&mut self, version: impl Into<String>) -> &mut Self {
        self.version = Some(version.into());
        self
    }

    pub fn category(&mut self, category: impl Into<String>) -> &mut Self {
        self.category = Some(category.into());
        self
    }

    /// Replace the tag list.
    pub fn tags<I, T>(&mut self, tags: I) -> &mut Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn step(&mut self, step: WorkflowStep) -> &mut Self {
        self.steps.push(step);
        self
    }

    pub fn steps(&mut self, steps: impl IntoIterator<Item = WorkflowStep>) -> &mut Self {
        self.steps.extend(steps);
        self
    }

    pub fn input(&mut self, input: IoDescriptor) -> &mut Self {
        self.inputs.push(input);
        self
    }

    pub fn output(&mut self, output: IoDescriptor) -> &mut Self {
        self.outputs.push(output);
        self
    }

    /// Append `step` guarded by `condition`.
    pub fn conditional_step(&mut self, step: WorkflowStep, condition: StepCondition) -> &mut Self {
        self.step(step.condition(condition))
    }

    /// Append every step flagged as parallel.
    pub fn parallel_steps(&mut self, steps: impl IntoIterator<Item = WorkflowStep>) -> &mut Self {
        self.steps
            .extend(steps.into_iter().map(|step| step.parallel(true)));
        self
    }

    /// Append a step that only runs when an earlier step failed.
    pub fn error_handler(&mut self, step: WorkflowStep) -> &mut Self {
        self.conditional_step(step, StepCondition::OnError)
    }

    /// Append a step that runs once the workflow completed.
    pub fn notification(&mut self, step: WorkflowStep) -> &mut Self {
        self.conditional_step(step, StepCondition::OnCompleted)
    }

    pub fn permissions(&mut self, permissions: Permissions) -> &mut Self {
        self.permissions = permissions;
        self
    }

    pub fn rate_limits(&mut self, rate_limits: RateLimits) -> &mut Self {
        self.rate_limits = rate_limits;
        self
    }

    pub fn error_handling(&mut self, error_handling: ErrorHandling) -> &mut Self {
        self.error_handling = error_handling;
        self
    }

    #[must_use]
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Validate the accumulated steps and return a copy of them.
    ///
    /// # Errors
    ///
    /// Propagates every [`validate_steps`] failure.
    pub fn build(&self) -> Result<Vec<WorkflowStep>, WorkflowError> {
        validate_steps(&self.steps)?;
        Ok(self.steps.clone())
    }

    /// Produce the complete definition, filling unset fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::MissingName`] when no non-empty name was
    /// set, and otherwise propagates every [`validate_steps`] failure.
    pub fn definition(&self) -> Result<WorkflowDefinition, WorkflowError> {
        let name = self
            .name
            .clone()
            .filter(|name| !name.is_empty())
            .ok_or(WorkflowError::MissingName)?;
        let steps = self.build()?;

        Ok(WorkflowDefinition {
            display_name: self.display_name.clone().unwrap_or_else(|| name.clone()),
            name,
            description: self.description.clone().unwrap_or_default(),
            version: self
                .version
                .clone()
                .unwrap_or_else(|| DEFAULT_VERSION.to_string()),
            category: self
                .category
                .clone()
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            tags: self.tags.clone(),
            steps,
            inputs: self.inputs.clone(),
            outputs: self.outputs.clone(),
            permissions: self.permissions.clone(),
            rate_limits: self.rate_limits,
            error_handling: self.error_handling,
        })
    }

    /// Return to the initial empty state.
    pub fn reset(&mut self) -> &mut Self {
        *self = Self::default();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::FailurePolicy;

    #[test]
    fn should_fill_defaults_when_only_name_and_step_are_set() {
        let definition = WorkflowBuilder::new()
            .name("w")
            .step(WorkflowStep::new("s1"))
            .definition()
            .unwrap();

        assert_eq!(definition.name, "w");
        assert_eq!(definition.display_name, "w");
        assert_eq!(definition.description, "");
        assert_eq!(definition.version, "1.0.0");
        assert_eq!(definition.category, "general");
        assert!(definition.tags.is_empty());
        assert_eq!(definition.rate_limits.max_executions_per_hour, 10);
        assert_eq!(definition.rate_limits.max_executions_per_day, 100);
        assert_eq!(definition.error_handling.on_failure, FailurePolicy::Retry);
        assert_eq!(definition.error_handling.max_retries, 3);
        assert_eq!(definition.error_handling.retry_delay_ms, 1000);
    }

    #[test]
    fn should_keep_explicit_metadata() {
        let definition = WorkflowBuilder::new()
            .name("onboarding")
            .display_name("User onboarding")
            .description("Welcome new users")
            .version("2.1.0")
            .category("users")
            .tags(["welcome", "email"])
            .input(IoDescriptor::new("user_id", "string").required())
            .output(IoDescriptor::new("sent", "boolean"))
            .permissions(Permissions {
                required: vec!["email.send".to_string()],
                optional: vec![],
            })
            .rate_limits(RateLimits {
                max_executions_per_hour: 1,
                max_executions_per_day: 5,
            })
            .error_handling(ErrorHandling {
                on_failure: FailurePolicy::Abort,
                max_retries: 0,
                retry_delay_ms: 0,
            })
            .step(WorkflowStep::new("send").action("email"))
            .definition()
            .unwrap();

        assert_eq!(definition.display_name, "User onboarding");
        assert_eq!(definition.version, "2.1.0");
        assert_eq!(definition.category, "users");
        assert_eq!(definition.tags, vec!["welcome", "email"]);
        assert!(definition.inputs[0].required);
        assert_eq!(definition.outputs[0].kind, "boolean");
        assert_eq!(definition.permissions.required, vec!["email.send"]);
        assert_eq!(definition.rate_limits.max_executions_per_day, 5);
        assert_eq!(definition.error_handling.on_failure, FailurePolicy::Abort);
    }

    #[test]
    fn should_require_name_for_definition() {
        let result = WorkflowBuilder::new().step(WorkflowStep::new("s1")).definition();
        assert_eq!(result, Err(WorkflowError::MissingName));
    }

    #[test]
    fn should_require_steps_for_definition_and_build() {
        let mut builder = WorkflowBuilder::new();
        builder.name("w");
        assert_eq!(builder.definition(), Err(WorkflowError::NoSteps));
        assert_eq!(builder.build(), Err(WorkflowError::NoSteps));
    }

    #[test]
    fn should_reject_cyclic_steps_in_definition() {
        let result = WorkflowBuilder::new()
            .name("w")
            .step(WorkflowStep::new("a").depends_on("b"))
            .step(WorkflowStep::new("b").depends_on("a"))
            .definition();
        assert!(matches!(
            result,
            Err(WorkflowError::CircularDependency { .. })
        ));
    }

    #[test]
    fn should_wrap_convenience_steps_with_conditions() {
        let steps = WorkflowBuilder::new()
            .step(WorkflowStep::new("main"))
            .error_handler(WorkflowStep::new("on_error"))
            .notification(WorkflowStep::new("notify"))
            .conditional_step(
                WorkflowStep::new("maybe"),
                StepCondition::Expression("{{count}} > 3".to_string()),
            )
            .build()
            .unwrap();

        assert_eq!(steps[0].condition, None);
        assert_eq!(steps[1].condition, Some(StepCondition::OnError));
        assert_eq!(steps[2].condition, Some(StepCondition::OnCompleted));
        assert_eq!(
            steps[3].condition.as_ref().map(StepCondition::expression),
            Some("{{count}} > 3")
        );
    }

    #[test]
    fn should_flag_parallel_steps() {
        let steps = WorkflowBuilder::new()
            .step(WorkflowStep::new("fetch"))
            .parallel_steps([
                WorkflowStep::new("resize").depends_on("fetch"),
                WorkflowStep::new("scan").depends_on("fetch"),
            ])
            .build()
            .unwrap();

        assert!(!steps[0].parallel);
        assert!(steps[1].parallel);
        assert!(steps[2].parallel);
    }

    #[test]
    fn should_clear_everything_on_reset() {
        let mut builder = WorkflowBuilder::new();
        builder
            .name("first")
            .category("ops")
            .steps([WorkflowStep::new("a"), WorkflowStep::new("b")]);
        assert_eq!(builder.step_count(), 2);

        let definition = builder
            .reset()
            .name("second")
            .step(WorkflowStep::new("only"))
            .definition()
            .unwrap();

        assert_eq!(definition.name, "second");
        assert_eq!(definition.category, "general");
        assert_eq!(definition.steps.len(), 1);
    }

    #[test]
    fn should_leave_builder_usable_after_build() {
        let mut builder = WorkflowBuilder::new();
        builder.name("w").step(WorkflowStep::new("a"));
        let first = builder.build().unwrap();
        builder.step(WorkflowStep::new("b").depends_on("a"));
        let second = builder.build().unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 2);
    }
}
