//! Event publishing port: hand named events to the engine for processing.

use std::future::Future;

use triggerhub_domain::error::TriggerHubError;
use triggerhub_domain::event::Event;

/// Accepts events for asynchronous processing.
pub trait EventPublisher {
    /// Publish an event. Processing happens in the background; this does
    /// not wait for any trigger to run.
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), TriggerHubError>> + Send;
}

impl<T: EventPublisher + Send + Sync> EventPublisher for std::sync::Arc<T> {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), TriggerHubError>> + Send {
        (**self).publish(event)
    }
}
