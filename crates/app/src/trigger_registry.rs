//! Registration-ordered store of triggers.

use std::collections::HashMap;

use triggerhub_domain::automation::Trigger;
use triggerhub_domain::error::ConflictError;
use triggerhub_domain::id::TriggerId;
use triggerhub_domain::time::Timestamp;

/// Triggers keyed by id, iterated in registration order.
#[derive(Debug, Default)]
pub struct TriggerRegistry {
    order: Vec<TriggerId>,
    by_id: HashMap<TriggerId, Trigger>,
}

impl TriggerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns [`ConflictError::DuplicateTrigger`] if the id is taken.
    pub fn insert(&mut self, trigger: Trigger) -> Result<(), ConflictError> {
        if self.by_id.contains_key(&trigger.id) {
            return Err(ConflictError::DuplicateTrigger(trigger.id));
        }
        self.order.push(trigger.id.clone());
        self.by_id.insert(trigger.id.clone(), trigger);
        Ok(())
    }

    pub fn remove(&mut self, id: &TriggerId) -> Option<Trigger> {
        let removed = self.by_id.remove(id)?;
        self.order.retain(|existing| existing != id);
        Some(removed)
    }

    #[must_use]
    pub fn get(&self, id: &TriggerId) -> Option<&Trigger> {
        self.by_id.get(id)
    }

    pub fn get_mut(&mut self, id: &TriggerId) -> Option<&mut Trigger> {
        self.by_id.get_mut(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Trigger> {
        self.order.iter().filter_map(|id| self.by_id.get(id))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    #[must_use]
    pub fn enabled_count(&self) -> usize {
        self.by_id.values().filter(|trigger| trigger.enabled).count()
    }

    /// Record a firing on every enabled trigger bound to `event` and return
    /// snapshots of them, in registration order.
    pub fn fire(&mut self, event: &str, at: Timestamp) -> Vec<Trigger> {
        let mut fired = Vec::new();
        for id in &self.order {
            if let Some(trigger) = self.by_id.get_mut(id)
                && trigger.fires_on(event)
            {
                trigger.record_firing(at);
                fired.push(trigger.clone());
            }
        }
        fired
    }
}

#[cfg(test)]
mod tests {
    use triggerhub_domain::automation::{Action, TriggerOptions};
    use triggerhub_domain::time::now;

    use super::*;

    fn trigger(id: &str, event: &str, enabled: bool) -> Trigger {
        Trigger::new(
            event,
            vec![Action::log("x")],
            TriggerOptions::default().id(id).enabled(enabled),
        )
        .unwrap()
    }

    #[test]
    fn should_reject_duplicate_id() {
        let mut registry = TriggerRegistry::new();
        registry.insert(trigger("a", "e", true)).unwrap();
        let err = registry.insert(trigger("a", "other", true)).unwrap_err();
        assert_eq!(err, ConflictError::DuplicateTrigger(TriggerId::from("a")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn should_fire_enabled_matches_in_registration_order() {
        let mut registry = TriggerRegistry::new();
        registry.insert(trigger("b", "e", true)).unwrap();
        registry.insert(trigger("off", "e", false)).unwrap();
        registry.insert(trigger("other", "f", true)).unwrap();
        registry.insert(trigger("a", "e", true)).unwrap();

        let at = now();
        let fired: Vec<_> = registry
            .fire("e", at)
            .into_iter()
            .map(|t| t.id.to_string())
            .collect();
        assert_eq!(fired, vec!["b", "a"]);

        let b = registry.get(&TriggerId::from("b")).unwrap();
        assert_eq!(b.trigger_count, 1);
        assert_eq!(b.last_triggered, Some(at));
        let off = registry.get(&TriggerId::from("off")).unwrap();
        assert_eq!(off.trigger_count, 0);
        assert!(off.last_triggered.is_none());
    }

    #[test]
    fn should_keep_order_after_removal() {
        let mut registry = TriggerRegistry::new();
        for id in ["a", "b", "c"] {
            registry.insert(trigger(id, "e", true)).unwrap();
        }
        assert!(registry.remove(&TriggerId::from("b")).is_some());
        assert!(registry.remove(&TriggerId::from("b")).is_none());
        let ids: Vec<_> = registry.iter().map(|t| t.id.to_string()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn should_count_enabled_triggers() {
        let mut registry = TriggerRegistry::new();
        registry.insert(trigger("a", "e", true)).unwrap();
        registry.insert(trigger("b", "e", false)).unwrap();
        assert_eq!(registry.enabled_count(), 1);
        registry.get_mut(&TriggerId::from("b")).unwrap().enabled = true;
        assert_eq!(registry.enabled_count(), 2);
    }
}
