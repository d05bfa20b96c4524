//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `triggerhub.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::time::Duration;

use serde::Deserialize;

use triggerhub_app::automation_engine::{DEFAULT_RESULTS_CAPACITY, EngineConfig};
use triggerhub_app::history::DEFAULT_HISTORY_CAPACITY;
use triggerhub_domain::automation::{Action, TriggerOptions};
use triggerhub_domain::id::TriggerId;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Automation engine tunables.
    pub engine: EngineSection,
    /// Triggers registered at startup.
    pub triggers: Vec<TriggerSeed>,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// `[engine]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EngineSection {
    pub history_capacity: usize,
    /// Buffer per execution-stream subscriber.
    pub results_capacity: usize,
    /// Per-action timeout in milliseconds; unset means no limit.
    pub action_timeout_ms: Option<u64>,
}

/// A `[[triggers]]` entry.
#[derive(Debug, Deserialize)]
pub struct TriggerSeed {
    pub id: Option<TriggerId>,
    pub event: String,
    pub description: Option<String>,
    pub enabled: Option<bool>,
    #[serde(default)]
    pub actions: Vec<Action>,
}

impl TriggerSeed {
    /// Split into the arguments of `AutomationEngine::register_trigger`.
    #[must_use]
    pub fn into_registration(self) -> (String, Vec<Action>, TriggerOptions) {
        let options = TriggerOptions {
            id: self.id,
            description: self.description,
            enabled: self.enabled,
        };
        (self.event, self.actions, options)
    }
}

impl Config {
    /// Load configuration from `triggerhub.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting values are out of range.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("triggerhub.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("TRIGGERHUB_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("TRIGGERHUB_PORT")
            && let Ok(port) = val.parse()
        {
            self.server.port = port;
        }
        if let Ok(val) = std::env::var("TRIGGERHUB_BIND")
            && let Some((host, port)) = val.rsplit_once(':')
        {
            self.server.host = host.to_string();
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("TRIGGERHUB_HISTORY_CAPACITY")
            && let Ok(capacity) = val.parse()
        {
            self.engine.history_capacity = capacity;
        }
        if let Ok(val) = std::env::var("TRIGGERHUB_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.engine.history_capacity == 0 {
            return Err(ConfigError::Validation(
                "engine.history_capacity must be non-zero".to_string(),
            ));
        }
        if self.engine.results_capacity == 0 {
            return Err(ConfigError::Validation(
                "engine.results_capacity must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    #[must_use]
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            history_capacity: self.engine.history_capacity,
            results_capacity: self.engine.results_capacity,
            action_timeout: self.engine.action_timeout_ms.map(Duration::from_millis),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "triggerhubd=info,triggerhub=info,triggerhub_app=info,tower_http=debug"
                .to_string(),
        }
    }
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            results_capacity: DEFAULT_RESULTS_CAPACITY,
            action_timeout_ms: None,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
