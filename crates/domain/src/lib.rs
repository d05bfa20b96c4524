//! # triggerhub-domain
//!
//! Pure domain model for the triggerhub automation core.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Events** (named occurrences carrying a read-only JSON payload)
//! - Define **Triggers** (event name → ordered list of actions)
//! - Define **Actions** and their optional payload **Conditions**
//! - Define **Execution results** (one record per trigger per dispatch)
//! - Define **Workflows** (step graphs) with their builder and validator
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! Handler execution and event routing live in the `app` crate.

pub mod error;
pub mod id;
pub mod time;

pub mod automation;
pub mod event;
pub mod workflow;
