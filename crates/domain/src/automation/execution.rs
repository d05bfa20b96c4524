//! Execution result: the outcome of one trigger firing.

use serde::{Deserialize, Serialize};

use crate::error::ActionError;
use crate::id::{ExecutionId, TriggerId};
use crate::time::{Timestamp, elapsed_millis, now};

const UNKNOWN_FAILURE: &str = "action failed without a message";

/// Outcome of firing one trigger for one published event.
///
/// Every action of the trigger is counted exactly once as executed,
/// failed, or skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub id: ExecutionId,
    pub trigger_id: TriggerId,
    pub event: String,
    pub actions_executed: usize,
    pub actions_failed: usize,
    pub actions_skipped: usize,
    /// Milliseconds between the start of the dispatch pass and completion.
    pub duration_ms: u64,
    pub timestamp: Timestamp,
    /// One message per failed action, in execution order.
    pub errors: Vec<String>,
}

impl ExecutionResult {
    /// Start an empty accumulator for `trigger_id` firing on `event`.
    #[must_use]
    pub fn begin(trigger_id: TriggerId, event: impl Into<String>) -> Self {
        Self {
            id: ExecutionId::new(),
            trigger_id,
            event: event.into(),
            actions_executed: 0,
            actions_failed: 0,
            actions_skipped: 0,
            duration_ms: 0,
            timestamp: now(),
            errors: Vec::new(),
        }
    }

    pub fn record_success(&mut self) {
        self.actions_executed += 1;
    }

    pub fn record_skip(&mut self) {
        self.actions_skipped += 1;
    }

    pub fn record_failure(&mut self, error: &ActionError) {
        self.actions_failed += 1;
        let message = error.to_string();
        if message.is_empty() {
            self.errors.push(UNKNOWN_FAILURE.to_string());
        } else {
            self.errors.push(message);
        }
    }

    /// Stamp completion time and the duration since `dispatch_started`.
    #[must_use]
    pub fn finish(mut self, dispatch_started: Timestamp) -> Self {
        let completed = now();
        self.duration_ms = elapsed_millis(dispatch_started, completed);
        self.timestamp = completed;
        self
    }

    /// Number of actions accounted for.
    #[must_use]
    pub fn actions_total(&self) -> usize {
        self.actions_executed + self.actions_failed + self.actions_skipped
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.actions_failed == 0
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn should_count_each_outcome_once() {
        let mut result = ExecutionResult::begin(TriggerId::from("t1"), "e");
        result.record_success();
        result.record_skip();
        result.record_failure(&ActionError::failed("boom"));
        assert_eq!(result.actions_executed, 1);
        assert_eq!(result.actions_skipped, 1);
        assert_eq!(result.actions_failed, 1);
        assert_eq!(result.actions_total(), 3);
        assert_eq!(result.errors, vec!["boom".to_string()]);
        assert!(!result.is_success());
    }

    #[test]
    fn should_fall_back_to_generic_message_for_empty_error() {
        let mut result = ExecutionResult::begin(TriggerId::from("t1"), "e");
        result.record_failure(&ActionError::failed(""));
        assert_eq!(result.errors, vec![UNKNOWN_FAILURE.to_string()]);
    }

    #[test]
    fn should_measure_duration_from_dispatch_start() {
        let started = now() - Duration::milliseconds(40);
        let result = ExecutionResult::begin(TriggerId::from("t1"), "e").finish(started);
        assert!(result.duration_ms >= 40);
        assert!(result.is_success());
    }
}
