//! Automation: event-bound triggers and the actions they run.
//!
//! A [`Trigger`] listens for a named event. When that event is published
//! and the trigger is enabled, each of its [`Action`]s is executed in order,
//! optionally guarded by an [`ActionCondition`] over the event payload.
//! Every firing produces one [`ExecutionResult`].

mod action;
mod condition;
mod execution;
mod trigger;

pub use action::{Action, ActionParams, ActionType};
pub use condition::{ActionCondition, Predicate};
pub use execution::ExecutionResult;
pub use trigger::{Trigger, TriggerOptions};
