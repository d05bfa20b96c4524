//! Trigger: binds an event name to an ordered list of actions.

use serde::{Deserialize, Serialize};

use crate::error::{TriggerHubError, ValidationError};
use crate::id::TriggerId;
use crate::time::{Timestamp, now};

use super::action::Action;

/// A registered rule: when `event` is published, run `actions` in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trigger {
    pub id: TriggerId,
    pub event: String,
    pub actions: Vec<Action>,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub last_triggered: Option<Timestamp>,
    pub trigger_count: u64,
}

/// Optional settings accepted when registering a trigger.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerOptions {
    pub id: Option<TriggerId>,
    pub description: Option<String>,
    pub enabled: Option<bool>,
}

impl TriggerOptions {
    #[must_use]
    pub fn id(mut self, id: impl Into<TriggerId>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }
}

impl Trigger {
    /// Create a trigger, generating an id when none is supplied.
    ///
    /// # Errors
    ///
    /// Returns [`TriggerHubError::Validation`] when the event name, the
    /// supplied id, or any action type is empty.
    pub fn new(
        event: impl Into<String>,
        actions: Vec<Action>,
        options: TriggerOptions,
    ) -> Result<Self, TriggerHubError> {
        let trigger = Self {
            id: options.id.unwrap_or_else(TriggerId::generate),
            event: event.into(),
            actions,
            enabled: options.enabled.unwrap_or(true),
            description: options.description,
            created_at: now(),
            last_triggered: None,
            trigger_count: 0,
        };
        trigger.validate()?;
        Ok(trigger)
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`TriggerHubError::Validation`] when:
    /// - `id` is empty ([`ValidationError::EmptyTriggerId`])
    /// - `event` is empty ([`ValidationError::EmptyEventName`])
    /// - an action has an empty type ([`ValidationError::EmptyActionType`])
    pub fn validate(&self) -> Result<(), TriggerHubError> {
        if self.id.is_empty() {
            return Err(ValidationError::EmptyTriggerId.into());
        }
        if self.event.is_empty() {
            return Err(ValidationError::EmptyEventName.into());
        }
        if self.actions.iter().any(|a| a.action_type.as_str().is_empty()) {
            return Err(ValidationError::EmptyActionType.into());
        }
        Ok(())
    }

    /// Whether a published `event` should fire this trigger.
    #[must_use]
    pub fn fires_on(&self, event: &str) -> bool {
        self.enabled && self.event == event
    }

    /// Account for one firing at `at`.
    pub fn record_firing(&mut self, at: Timestamp) {
        self.trigger_count += 1;
        self.last_triggered = Some(at);
    }
}
