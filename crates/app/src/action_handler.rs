//! Action handlers and the registry that resolves action types to them.

mod builtin;

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use triggerhub_domain::automation::{ActionParams, ActionType};
use triggerhub_domain::error::{ActionError, ConflictError};
use triggerhub_domain::event::Payload;

pub use builtin::{
    ExecuteCommandHandler, LogHandler, LogLevel, LogParams, NotifyHandler, NotifyParams,
    WebhookHandler,
};

/// Executes one kind of action.
///
/// Handlers are shared between concurrent dispatch passes and must not
/// assume exclusive access to anything they capture.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    /// Run the action with its configured params against the event payload.
    ///
    /// # Errors
    ///
    /// Any [`ActionError`] is recorded as one failed action of the
    /// current execution; it never aborts the remaining actions.
    async fn handle(&self, params: &ActionParams, payload: &Payload) -> Result<(), ActionError>;
}

/// Handler backed by an async closure over the raw params.
pub struct FnHandler<F> {
    func: F,
}

/// Wrap an async closure as an [`ActionHandler`].
pub fn handler_fn<F, Fut>(func: F) -> FnHandler<F>
where
    F: Fn(ActionParams, Payload) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ActionError>> + Send + 'static,
{
    FnHandler { func }
}

#[async_trait]
impl<F, Fut> ActionHandler for FnHandler<F>
where
    F: Fn(ActionParams, Payload) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ActionError>> + Send + 'static,
{
    async fn handle(&self, params: &ActionParams, payload: &Payload) -> Result<(), ActionError> {
        (self.func)(params.clone(), payload.clone()).await
    }
}

/// Handler that parses its params into `P` before calling the closure.
pub struct TypedFnHandler<P, F> {
    func: F,
    _params: PhantomData<fn() -> P>,
}

/// Wrap an async closure taking a typed parameter shape.
///
/// Params that do not deserialize into `P` fail the action with
/// [`ActionError::InvalidParams`] without calling the closure.
pub fn typed_handler_fn<P, F, Fut>(func: F) -> TypedFnHandler<P, F>
where
    P: DeserializeOwned + Send + 'static,
    F: Fn(P, Payload) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ActionError>> + Send + 'static,
{
    TypedFnHandler {
        func,
        _params: PhantomData,
    }
}

#[async_trait]
impl<P, F, Fut> ActionHandler for TypedFnHandler<P, F>
where
    P: DeserializeOwned + Send + 'static,
    F: Fn(P, Payload) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ActionError>> + Send + 'static,
{
    async fn handle(&self, params: &ActionParams, payload: &Payload) -> Result<(), ActionError> {
        let typed = params
            .parse::<P>()
            .map_err(|err| ActionError::InvalidParams(err.to_string()))?;
        (self.func)(typed, payload.clone()).await
    }
}

/// Map from action type to handler.
#[derive(Default, Clone)]
pub struct ActionHandlerRegistry {
    handlers: HashMap<ActionType, Arc<dyn ActionHandler>>,
}

impl ActionHandlerRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry seeded with `log`, `notify`, `execute_command` and `webhook`.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut handlers: HashMap<ActionType, Arc<dyn ActionHandler>> = HashMap::new();
        handlers.insert(ActionType::LOG, Arc::new(LogHandler));
        handlers.insert(ActionType::NOTIFY, Arc::new(NotifyHandler));
        handlers.insert(ActionType::EXECUTE_COMMAND, Arc::new(ExecuteCommandHandler));
        handlers.insert(ActionType::WEBHOOK, Arc::new(WebhookHandler));
        Self { handlers }
    }

    /// Register `handler` for `action_type`.
    ///
    /// # Errors
    ///
    /// Returns [`ConflictError::DuplicateHandler`] if the type already has a
    /// handler; the existing one is kept.
    pub fn register(
        &mut self,
        action_type: ActionType,
        handler: Arc<dyn ActionHandler>,
    ) -> Result<(), ConflictError> {
        if self.handlers.contains_key(&action_type) {
            return Err(ConflictError::DuplicateHandler(action_type.to_string()));
        }
        self.handlers.insert(action_type, handler);
        Ok(())
    }

    /// Look up the handler for `action_type`.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::UnregisteredHandler`] when nothing is registered.
    pub fn resolve(&self, action_type: &ActionType) -> Result<Arc<dyn ActionHandler>, ActionError> {
        self.handlers
            .get(action_type)
            .cloned()
            .ok_or_else(|| ActionError::UnregisteredHandler(action_type.to_string()))
    }

    #[must_use]
    pub fn contains(&self, action_type: &ActionType) -> bool {
        self.handlers.contains_key(action_type)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Registered action types, sorted.
    #[must_use]
    pub fn types(&self) -> Vec<ActionType> {
        let mut types: Vec<_> = self.handlers.keys().cloned().collect();
        types.sort();
        types
    }
}

impl fmt::Debug for ActionHandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionHandlerRegistry")
            .field("types", &self.types())
            .finish()
    }
}
