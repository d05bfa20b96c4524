//! Port definitions: traits at the boundary of the application core.
//!
//! Ports are defined here (in `app`) so that both the engine and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod event_publisher;

pub use event_publisher::EventPublisher;
