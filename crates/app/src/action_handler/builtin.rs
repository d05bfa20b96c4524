//! Handlers registered by [`ActionHandlerRegistry::with_defaults`](super::ActionHandlerRegistry::with_defaults).

use async_trait::async_trait;
use serde::Deserialize;

use triggerhub_domain::automation::ActionParams;
use triggerhub_domain::error::ActionError;
use triggerhub_domain::event::Payload;

use super::ActionHandler;

/// Severity accepted by the `log` action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

/// Params of the `log` action.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LogParams {
    pub message: Option<String>,
    pub level: LogLevel,
}

/// Emits a tracing event with the message and the event payload.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogHandler;

#[async_trait]
impl ActionHandler for LogHandler {
    async fn handle(&self, params: &ActionParams, payload: &Payload) -> Result<(), ActionError> {
        let params: LogParams = params
            .parse()
            .map_err(|err| ActionError::InvalidParams(err.to_string()))?;
        let message = params.message.as_deref().unwrap_or("");
        match params.level {
            LogLevel::Trace => tracing::trace!(%payload, "{message}"),
            LogLevel::Debug => tracing::debug!(%payload, "{message}"),
            LogLevel::Info => tracing::info!(%payload, "{message}"),
            LogLevel::Warn => tracing::warn!(%payload, "{message}"),
            LogLevel::Error => tracing::error!(%payload, "{message}"),
        }
        Ok(())
    }
}

/// Params of the `notify` action.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NotifyParams {
    pub title: Option<String>,
    pub message: Option<String>,
    pub channel: Option<String>,
}

/// Writes a notification line on the `triggerhub::notify` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct NotifyHandler;

#[async_trait]
impl ActionHandler for NotifyHandler {
    async fn handle(&self, params: &ActionParams, _payload: &Payload) -> Result<(), ActionError> {
        let params: NotifyParams = params
            .parse()
            .map_err(|err| ActionError::InvalidParams(err.to_string()))?;
        tracing::info!(
            target: "triggerhub::notify",
            title = params.title.as_deref().unwrap_or("notification"),
            channel = params.channel.as_deref().unwrap_or("default"),
            "{}",
            params.message.as_deref().unwrap_or("")
        );
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CommandParams {
    command: Option<String>,
}

/// Placeholder: records the command it would run and succeeds.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExecuteCommandHandler;

#[async_trait]
impl ActionHandler for ExecuteCommandHandler {
    async fn handle(&self, params: &ActionParams, _payload: &Payload) -> Result<(), ActionError> {
        let params: CommandParams = params
            .parse()
            .map_err(|err| ActionError::InvalidParams(err.to_string()))?;
        tracing::debug!(command = ?params.command, "execute_command action");
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WebhookParams {
    url: Option<String>,
    method: Option<String>,
}

/// Placeholder: records the request it would send and succeeds.
#[derive(Debug, Default, Clone, Copy)]
pub struct WebhookHandler;

#[async_trait]
impl ActionHandler for WebhookHandler {
    async fn handle(&self, params: &ActionParams, _payload: &Payload) -> Result<(), ActionError> {
        let params: WebhookParams = params
            .parse()
            .map_err(|err| ActionError::InvalidParams(err.to_string()))?;
        tracing::debug!(
            url = ?params.url,
            method = params.method.as_deref().unwrap_or("POST"),
            "webhook action"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(value: serde_json::Value) -> ActionParams {
        match value {
            serde_json::Value::Object(map) => ActionParams::from(map),
            other => panic!("expected object, got {other}"),
        }
    }

    #[tokio::test]
    async fn should_log_at_requested_level() {
        for level in ["trace", "debug", "info", "warn", "error"] {
            let result = LogHandler
                .handle(
                    &params(serde_json::json!({"message": "hi", "level": level})),
                    &Payload::empty(),
                )
                .await;
            assert!(result.is_ok(), "level {level}");
        }
    }

    #[tokio::test]
    async fn should_reject_log_params_when_level_unknown() {
        let err = LogHandler
            .handle(
                &params(serde_json::json!({"level": "loud"})),
                &Payload::empty(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::InvalidParams(_)));
    }

    #[tokio::test]
    async fn should_succeed_placeholders_with_empty_params() {
        let empty = ActionParams::new();
        assert!(NotifyHandler.handle(&empty, &Payload::empty()).await.is_ok());
        assert!(ExecuteCommandHandler.handle(&empty, &Payload::empty()).await.is_ok());
        assert!(WebhookHandler.handle(&empty, &Payload::empty()).await.is_ok());
    }

    #[tokio::test]
    async fn should_reject_notify_params_when_title_is_not_a_string() {
        let err = NotifyHandler
            .handle(&params(serde_json::json!({"title": 3})), &Payload::empty())
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::InvalidParams(_)));
    }
}
