//! Automation engine: maps published events to triggers and runs their actions.
//!
//! The engine owns the trigger registry, the action handler registry and the
//! execution history. Events reach it either through an unbounded queue
//! ([`AutomationEngine::trigger_event`], drained by the listener task started
//! with [`AutomationEngine::start`]) or inline through
//! [`AutomationEngine::dispatch`], which returns the results it appended.
//! Queued events are never dropped: they wait until a listener drains them.
//!
//! For every event, enabled triggers bound to its name fire in registration
//! order. Each trigger runs its actions sequentially; a failing action is
//! recorded and the next one still runs.

use std::collections::HashSet;
use std::future::Future;
use std::sync::{Arc, Weak};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{Mutex, RwLock, broadcast, mpsc, watch};
use tokio::task::JoinHandle;

use triggerhub_domain::automation::{Action, ActionType, ExecutionResult, Trigger, TriggerOptions};
use triggerhub_domain::error::{ActionError, NotFoundError, TriggerHubError};
use triggerhub_domain::event::{Event, Payload};
use triggerhub_domain::id::TriggerId;
use triggerhub_domain::time::now;

use crate::action_handler::{ActionHandler, ActionHandlerRegistry};
use crate::history::{DEFAULT_HISTORY_CAPACITY, DEFAULT_HISTORY_LIMIT, ExecutionHistory};
use crate::ports::EventPublisher;
use crate::trigger_registry::TriggerRegistry;

/// Results buffered for each subscriber of [`AutomationEngine::subscribe_results`].
pub const DEFAULT_RESULTS_CAPACITY: usize = 256;

/// Tunables for an [`AutomationEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Execution results retained before the oldest is evicted.
    pub history_capacity: usize,
    /// Results a slow stream subscriber may fall behind by before it lags.
    /// The event queue itself is unbounded.
    pub results_capacity: usize,
    /// Upper bound on a single handler invocation. `None` waits forever.
    pub action_timeout: Option<Duration>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            results_capacity: DEFAULT_RESULTS_CAPACITY,
            action_timeout: None,
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    #[must_use]
    pub fn results_capacity(mut self, capacity: usize) -> Self {
        self.results_capacity = capacity;
        self
    }

    #[must_use]
    pub fn action_timeout(mut self, timeout: Duration) -> Self {
        self.action_timeout = Some(timeout);
        self
    }
}

/// Aggregate counters over the engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    pub total_triggers: usize,
    pub enabled_triggers: usize,
    /// Entries currently retained in the history.
    pub total_executions: usize,
    /// Failed actions summed over the retained history.
    pub total_errors: usize,
    pub action_handlers: usize,
}

enum Outcome {
    Executed,
    Skipped,
    Failed(ActionError),
}

struct Inner {
    triggers: RwLock<TriggerRegistry>,
    subscriptions: RwLock<HashSet<String>>,
    handlers: RwLock<ActionHandlerRegistry>,
    history: Mutex<ExecutionHistory>,
    queue: mpsc::UnboundedSender<Event>,
    receiver: Arc<Mutex<mpsc::UnboundedReceiver<Event>>>,
    stop: watch::Sender<bool>,
    listener: Mutex<Option<JoinHandle<()>>>,
    results: broadcast::Sender<ExecutionResult>,
    action_timeout: Option<Duration>,
}

/// Cloneable handle to a running automation engine.
///
/// Clones share state. The listener task holds only a weak reference, so
/// dropping every handle stops it.
#[derive(Clone)]
pub struct AutomationEngine {
    inner: Arc<Inner>,
}

impl Default for AutomationEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl AutomationEngine {
    /// Build an engine with the default action handlers registered.
    ///
    /// The event queue exists from the start, so events published before
    /// [`start`](Self::start) are kept and processed once it runs.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let (queue, receiver) = mpsc::unbounded_channel();
        let (stop, _) = watch::channel(false);
        let (results, _) = broadcast::channel(config.results_capacity.max(1));
        Self {
            inner: Arc::new(Inner {
                triggers: RwLock::new(TriggerRegistry::new()),
                subscriptions: RwLock::new(HashSet::new()),
                handlers: RwLock::new(ActionHandlerRegistry::with_defaults()),
                history: Mutex::new(ExecutionHistory::with_capacity(config.history_capacity)),
                queue,
                receiver: Arc::new(Mutex::new(receiver)),
                stop,
                listener: Mutex::new(None),
                results,
                action_timeout: config.action_timeout,
            }),
        }
    }

    /// Spawn the listener that drains the event queue. Must run inside a
    /// tokio runtime. Returns `false` if it was already running.
    pub async fn start(&self) -> bool {
        let mut listener = self.inner.listener.lock().await;
        if listener.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return false;
        }
        self.inner.stop.send_replace(false);
        *listener = Some(tokio::spawn(listen(
            Arc::downgrade(&self.inner),
            Arc::clone(&self.inner.receiver),
            self.inner.stop.subscribe(),
        )));
        tracing::info!("automation engine started");
        true
    }

    /// Stop the listener once the event it is processing has been recorded.
    ///
    /// Events still queued, and those published afterwards, stay in the
    /// queue until the next [`start`](Self::start).
    pub async fn shutdown(&self) {
        let mut listener = self.inner.listener.lock().await;
        let Some(handle) = listener.take() else {
            return;
        };
        self.inner.stop.send_replace(true);
        if let Err(error) = handle.await {
            tracing::warn!(%error, "automation listener ended abnormally");
        }
        tracing::info!("automation engine stopped");
    }

    /// Register a trigger and subscribe to its event name.
    ///
    /// # Errors
    ///
    /// Returns a validation error for empty names or action types and a
    /// conflict if the supplied id is already registered.
    #[tracing::instrument(skip_all, fields(event = tracing::field::Empty))]
    pub async fn register_trigger(
        &self,
        event: impl Into<String>,
        actions: Vec<Action>,
        options: TriggerOptions,
    ) -> Result<TriggerId, TriggerHubError> {
        let trigger = Trigger::new(event, actions, options)?;
        tracing::Span::current().record("event", trigger.event.as_str());
        let id = trigger.id.clone();
        let event_name = trigger.event.clone();

        let mut triggers = self.inner.triggers.write().await;
        triggers.insert(trigger)?;
        self.inner.subscriptions.write().await.insert(event_name);
        drop(triggers);

        tracing::info!(%id, "trigger registered");
        Ok(id)
    }

    /// Remove a trigger. Its event name stays subscribed.
    ///
    /// # Errors
    ///
    /// Returns a not-found error when no trigger has this id.
    #[tracing::instrument(skip(self))]
    pub async fn unregister_trigger(&self, id: &TriggerId) -> Result<(), TriggerHubError> {
        self.inner
            .triggers
            .write()
            .await
            .remove(id)
            .ok_or_else(|| trigger_not_found(id))?;
        tracing::info!("trigger unregistered");
        Ok(())
    }

    /// Enable or disable a trigger, returning its updated state.
    ///
    /// # Errors
    ///
    /// Returns a not-found error when no trigger has this id.
    #[tracing::instrument(skip(self))]
    pub async fn set_trigger_enabled(
        &self,
        id: &TriggerId,
        enabled: bool,
    ) -> Result<Trigger, TriggerHubError> {
        let mut triggers = self.inner.triggers.write().await;
        let trigger = triggers.get_mut(id).ok_or_else(|| trigger_not_found(id))?;
        trigger.enabled = enabled;
        Ok(trigger.clone())
    }

    /// Register a handler for a new action type.
    ///
    /// # Errors
    ///
    /// Returns a conflict if the type already has a handler.
    pub async fn register_action_handler(
        &self,
        action_type: impl Into<ActionType>,
        handler: impl ActionHandler + 'static,
    ) -> Result<(), TriggerHubError> {
        let action_type = action_type.into();
        self.inner
            .handlers
            .write()
            .await
            .register(action_type.clone(), Arc::new(handler))?;
        tracing::info!(%action_type, "action handler registered");
        Ok(())
    }

    /// Queue an event for the listener to process and return immediately.
    pub fn trigger_event(&self, event: impl Into<String>, payload: impl Into<Payload>) {
        self.inner.enqueue(Event::new(event, payload));
    }

    /// Process an event inline and return the results appended to history,
    /// one per fired trigger.
    pub async fn dispatch(
        &self,
        event: impl Into<String>,
        payload: impl Into<Payload>,
    ) -> Vec<ExecutionResult> {
        self.inner.handle_event(&Event::new(event, payload)).await
    }

    /// Snapshot of all triggers in registration order.
    pub async fn triggers(&self) -> Vec<Trigger> {
        self.inner.triggers.read().await.iter().cloned().collect()
    }

    /// # Errors
    ///
    /// Returns a not-found error when no trigger has this id.
    pub async fn trigger(&self, id: &TriggerId) -> Result<Trigger, TriggerHubError> {
        self.inner
            .triggers
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| trigger_not_found(id))
    }

    /// The newest `limit` results (default 100), oldest first.
    pub async fn execution_history(&self, limit: Option<usize>) -> Vec<ExecutionResult> {
        self.inner
            .history
            .lock()
            .await
            .recent(limit.unwrap_or(DEFAULT_HISTORY_LIMIT))
    }

    pub async fn clear_history(&self) {
        self.inner.history.lock().await.clear();
        tracing::info!("execution history cleared");
    }

    pub async fn stats(&self) -> EngineStats {
        let (total_triggers, enabled_triggers) = {
            let triggers = self.inner.triggers.read().await;
            (triggers.len(), triggers.enabled_count())
        };
        let (total_executions, total_errors) = {
            let history = self.inner.history.lock().await;
            (history.len(), history.total_failed_actions())
        };
        let action_handlers = self.inner.handlers.read().await.len();
        EngineStats {
            total_triggers,
            enabled_triggers,
            total_executions,
            total_errors,
            action_handlers,
        }
    }

    /// Receive every execution result as it is appended to history.
    #[must_use]
    pub fn subscribe_results(&self) -> broadcast::Receiver<ExecutionResult> {
        self.inner.results.subscribe()
    }
}

impl EventPublisher for AutomationEngine {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), TriggerHubError>> + Send {
        self.inner.enqueue(event);
        async { Ok(()) }
    }
}

fn trigger_not_found(id: &TriggerId) -> TriggerHubError {
    NotFoundError {
        entity: "trigger",
        id: id.to_string(),
    }
    .into()
}

/// Drain the queue until asked to stop. The stop flag is only observed
/// between events, so an event that was picked up is always recorded.
async fn listen(
    engine: Weak<Inner>,
    queue: Arc<Mutex<mpsc::UnboundedReceiver<Event>>>,
    mut stop: watch::Receiver<bool>,
) {
    let mut receiver = queue.lock_owned().await;
    loop {
        tokio::select! {
            biased;
            changed = stop.changed() => {
                if changed.is_err() || *stop.borrow_and_update() {
                    break;
                }
            }
            next = receiver.recv() => {
                let Some(event) = next else {
                    break;
                };
                let Some(inner) = engine.upgrade() else {
                    break;
                };
                let subscribed = inner.subscriptions.read().await.contains(&event.name);
                if subscribed {
                    inner.handle_event(&event).await;
                }
            }
        }
    }
    tracing::debug!("automation listener stopped");
}

impl Inner {
    fn enqueue(&self, event: Event) {
        tracing::debug!(event = %event.name, "event published");
        // The receiver lives as long as `Inner`, so this only fails during teardown.
        if self.queue.send(event).is_err() {
            tracing::warn!("event queue closed, event dropped");
        }
    }

    async fn handle_event(&self, event: &Event) -> Vec<ExecutionResult> {
        let started = now();
        let fired = self.triggers.write().await.fire(&event.name, started);
        if fired.is_empty() {
            tracing::debug!(event = %event.name, "no enabled trigger for event");
            return Vec::new();
        }

        let mut results = Vec::with_capacity(fired.len());
        for trigger in &fired {
            let result = self.execute_trigger(trigger, event).await.finish(started);
            if result.is_success() {
                tracing::debug!(
                    trigger = %trigger.id,
                    executed = result.actions_executed,
                    "trigger executed"
                );
            } else {
                tracing::warn!(
                    trigger = %trigger.id,
                    failed = result.actions_failed,
                    "trigger executed with failures"
                );
            }
            self.history.lock().await.push(result.clone());
            // No subscribers is fine.
            let _ = self.results.send(result.clone());
            results.push(result);
        }
        results
    }

    async fn execute_trigger(&self, trigger: &Trigger, event: &Event) -> ExecutionResult {
        let mut result = ExecutionResult::begin(trigger.id.clone(), event.name.clone());
        for action in &trigger.actions {
            match self.run_action(action, &event.payload).await {
                Outcome::Executed => result.record_success(),
                Outcome::Skipped => result.record_skip(),
                Outcome::Failed(error) => {
                    tracing::warn!(
                        trigger = %trigger.id,
                        action = %action.action_type,
                        %error,
                        "action failed"
                    );
                    result.record_failure(&error);
                }
            }
        }
        result
    }

    async fn run_action(&self, action: &Action, payload: &Payload) -> Outcome {
        if let Some(condition) = &action.condition {
            match condition.evaluate(payload) {
                Ok(true) => {}
                Ok(false) => return Outcome::Skipped,
                Err(error) => return Outcome::Failed(error),
            }
        }

        let handler = match self.handlers.read().await.resolve(&action.action_type) {
            Ok(handler) => handler,
            Err(error) => return Outcome::Failed(error),
        };

        let invocation = handler.handle(&action.params, payload);
        let outcome = match self.action_timeout {
            Some(limit) => tokio::time::timeout(limit, invocation)
                .await
                .unwrap_or_else(|_| {
                    Err(ActionError::TimedOut(
                        u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                    ))
                }),
            None => invocation.await,
        };
        match outcome {
            Ok(()) => Outcome::Executed,
            Err(error) => Outcome::Failed(error),
        }
    }
}
