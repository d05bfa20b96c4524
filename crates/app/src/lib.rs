//! # triggerhub-app
//!
//! Application layer: the automation engine and its collaborators.
//!
//! ## Responsibilities
//! - Define the **`ActionHandler`** trait and the registry that resolves
//!   action types to handlers (seeded with `log`, `notify`,
//!   `execute_command` and `webhook`)
//! - Own the **trigger registry** (unique ids, registration order)
//! - Keep a bounded **execution history**
//! - Expose the **`AutomationEngine`**: trigger CRUD, fire-and-forget and
//!   awaitable event dispatch over a lossless queue, history and stats
//!   queries, and a broadcast stream of execution results
//!
//! ## Dependency rule
//! Depends on `triggerhub-domain` only (plus `tokio` for sync primitives,
//! timers and the dispatch task). Never imports adapter crates.

pub mod action_handler;
pub mod automation_engine;
pub mod history;
pub mod ports;
pub mod trigger_registry;
