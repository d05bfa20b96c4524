//! Condition: a guard over the event payload deciding whether an action runs.

use std::fmt;
use std::sync::Arc;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::ActionError;
use crate::event::Payload;

type PredicateFn = dyn Fn(&serde_json::Value) -> Result<bool, String> + Send + Sync;

/// In-process predicate over the event payload.
///
/// Only its label survives serialization; predicates registered from code
/// cannot be read back from JSON.
#[derive(Clone)]
pub struct Predicate {
    label: String,
    func: Arc<PredicateFn>,
}

impl Predicate {
    #[must_use]
    pub fn new<F>(label: impl Into<String>, func: F) -> Self
    where
        F: Fn(&serde_json::Value) -> Result<bool, String> + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            func: Arc::new(func),
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl Serialize for Predicate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Predicate", 1)?;
        state.serialize_field("label", &self.label)?;
        state.end()
    }
}

/// Guard evaluated against the event payload before an action runs.
///
/// Paths are JSON pointers (`/user/role`); a dotted form (`user.role`) is
/// accepted as well.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionCondition {
    /// The value at `path` equals `value`.
    FieldEquals {
        path: String,
        value: serde_json::Value,
    },
    /// Some value exists at `path`.
    FieldExists { path: String },
    Not { condition: Box<ActionCondition> },
    /// Every nested condition holds. Empty is true.
    All { conditions: Vec<ActionCondition> },
    /// At least one nested condition holds. Empty is false.
    Any { conditions: Vec<ActionCondition> },
    /// Arbitrary predicate supplied from code.
    #[serde(skip_deserializing)]
    Custom(Predicate),
}

impl ActionCondition {
    #[must_use]
    pub fn field_equals(path: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self::FieldEquals {
            path: path.into(),
            value: value.into(),
        }
    }

    #[must_use]
    pub fn field_exists(path: impl Into<String>) -> Self {
        Self::FieldExists { path: path.into() }
    }

    #[must_use]
    pub fn negate(self) -> Self {
        Self::Not {
            condition: Box::new(self),
        }
    }

    #[must_use]
    pub fn custom<F>(label: impl Into<String>, func: F) -> Self
    where
        F: Fn(&serde_json::Value) -> Result<bool, String> + Send + Sync + 'static,
    {
        Self::Custom(Predicate::new(label, func))
    }

    /// Evaluate the condition against an event payload.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Condition`] when a custom predicate fails.
    pub fn evaluate(&self, payload: &Payload) -> Result<bool, ActionError> {
        match self {
            Self::FieldEquals { path, value } => Ok(lookup(payload, path) == Some(value)),
            Self::FieldExists { path } => Ok(lookup(payload, path).is_some()),
            Self::Not { condition } => condition.evaluate(payload).map(|held| !held),
            Self::All { conditions } => {
                for condition in conditions {
                    if !condition.evaluate(payload)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Self::Any { conditions } => {
                for condition in conditions {
                    if condition.evaluate(payload)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Self::Custom(predicate) => {
                (predicate.func)(&**payload).map_err(ActionError::Condition)
            }
        }
    }
}

fn lookup<'a>(payload: &'a Payload, path: &str) -> Option<&'a serde_json::Value> {
    if path.is_empty() || path.starts_with('/') {
        payload.pointer(path)
    } else {
        payload.pointer(&format!("/{}", path.replace('.', "/")))
    }
}
