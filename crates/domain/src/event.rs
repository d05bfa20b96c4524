//! Event: a named occurrence announced to the automation engine.
//!
//! Events carry a JSON payload. The payload is shared behind an [`Arc`] so
//! every action of every trigger fired by one event observes the same
//! read-only snapshot.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::time::{Timestamp, now};

/// Immutable, cheaply cloneable event payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Payload(Arc<serde_json::Value>);

impl Payload {
    /// Wrap a JSON value.
    #[must_use]
    pub fn new(value: serde_json::Value) -> Self {
        Self(Arc::new(value))
    }

    /// An empty JSON object.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(serde_json::Value::Object(serde_json::Map::new()))
    }

    /// Look up a nested value with a JSON pointer such as `/user/role`.
    #[must_use]
    pub fn pointer(&self, path: &str) -> Option<&serde_json::Value> {
        self.0.pointer(path)
    }
}

impl Deref for Payload {
    type Target = serde_json::Value;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<serde_json::Value> for Payload {
    fn from(value: serde_json::Value) -> Self {
        Self::new(value)
    }
}

impl Serialize for Payload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.as_ref().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Payload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Self::new)
    }
}

/// A published event: what happened, with which data, and when.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    pub payload: Payload,
    pub timestamp: Timestamp,
}

impl Event {
    /// Create an event stamped with the current time.
    #[must_use]
    pub fn new(name: impl Into<String>, payload: impl Into<Payload>) -> Self {
        Self {
            name: name.into(),
            payload: payload.into(),
            timestamp: now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_share_payload_between_clones() {
        let payload = Payload::new(serde_json::json!({"user": "ada"}));
        let clone = payload.clone();
        assert!(Arc::ptr_eq(&payload.0, &clone.0));
    }

    #[test]
    fn should_resolve_json_pointer_into_payload() {
        let payload = Payload::new(serde_json::json!({"user": {"role": "admin"}}));
        assert_eq!(payload.pointer("/user/role"), Some(&serde_json::json!("admin")));
        assert!(payload.pointer("/user/missing").is_none());
    }

    #[test]
    fn should_serialize_payload_as_bare_json() {
        let event = Event::new("user.login", serde_json::json!({"id": 7}));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["name"], "user.login");
        assert_eq!(json["payload"]["id"], 7);
    }

    #[test]
    fn should_default_to_null_payload() {
        assert!(Payload::default().is_null());
        assert!(Payload::empty().is_object());
    }
}
