//! Action: one step of work performed when a trigger fires.

use std::borrow::Cow;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::condition::ActionCondition;

/// Key used to resolve an action against the handler registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionType(Cow<'static, str>);

impl ActionType {
    /// Write a line to the log.
    pub const LOG: Self = Self(Cow::Borrowed("log"));
    /// Emit a user-facing notification.
    pub const NOTIFY: Self = Self(Cow::Borrowed("notify"));
    /// Run a shell command (placeholder handler by default).
    pub const EXECUTE_COMMAND: Self = Self(Cow::Borrowed("execute_command"));
    /// Call an HTTP webhook (placeholder handler by default).
    pub const WEBHOOK: Self = Self(Cow::Borrowed("webhook"));

    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActionType {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ActionType {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Key-value configuration handed to an action handler.
///
/// Stored as a JSON object so heterogeneous actions can live in one list;
/// handlers recover their own typed shape with [`ActionParams::parse`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionParams(serde_json::Map<String, serde_json::Value>);

impl ActionParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    /// Return the string parameter stored under `key`, if any.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(serde_json::Value::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.0.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Deserialize the parameters into a handler-specific shape.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error when the parameters do not fit `T`.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(serde_json::Value::Object(self.0.clone()))
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for ActionParams {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        Self(map)
    }
}

/// An operation executed when its trigger fires.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub action_type: ActionType,
    #[serde(default)]
    pub params: ActionParams,
    /// When present and false for the event payload, the action is skipped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<ActionCondition>,
}

impl Action {
    #[must_use]
    pub fn new(action_type: impl Into<ActionType>) -> Self {
        Self {
            action_type: action_type.into(),
            params: ActionParams::new(),
            condition: None,
        }
    }

    /// Shorthand for a `log` action with the given message.
    #[must_use]
    pub fn log(message: impl Into<String>) -> Self {
        Self::new(ActionType::LOG).param("message", message.into())
    }

    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.params.insert(key, value);
        self
    }

    #[must_use]
    pub fn params(mut self, params: ActionParams) -> Self {
        self.params = params;
        self
    }

    #[must_use]
    pub fn when(mut self, condition: ActionCondition) -> Self {
        self.condition = Some(condition);
        self
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.condition.is_some() {
            write!(f, "{}(conditional)", self.action_type)
        } else {
            write!(f, "{}", self.action_type)
        }
    }
}
