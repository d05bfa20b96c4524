//! Shared application state for axum handlers.

use std::sync::Arc;

use triggerhub_app::automation_engine::AutomationEngine;

/// Application state shared across all axum handlers.
///
/// The engine handle is itself cheap to clone; the `Arc` keeps the state
/// a single pointer copy per request.
#[derive(Clone, Default)]
pub struct AppState {
    pub engine: Arc<AutomationEngine>,
}

impl AppState {
    #[must_use]
    pub fn new(engine: AutomationEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}
