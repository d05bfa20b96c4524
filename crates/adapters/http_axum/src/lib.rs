//! # triggerhub-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a JSON API over the automation engine: trigger CRUD, event
//!   publication (fire-and-forget or awaited), execution history and stats
//! - Stream execution results as Server-Sent Events
//! - Validate workflow definitions through the domain builder
//!
//! ## Dependency rule
//! Depends on `triggerhub-app` (engine, ports) and `triggerhub-domain`
//! (request/response types). Never leaks axum types into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
