//! # triggerhubd
//!
//! Composition root that builds the automation engine and serves it over HTTP.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Initialise `tracing` from the configured filter
//! - Construct the [`AutomationEngine`], start its listener and register
//!   the `[[triggers]]` declared in the config
//! - Build the axum router and serve until SIGINT/SIGTERM
//! - Stop the engine after the server drains
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer: no domain logic belongs here.

mod config;

use tracing_subscriber::EnvFilter;

use triggerhub_adapter_http_axum::state::AppState;
use triggerhub_app::automation_engine::AutomationEngine;
use triggerhub_domain::error::TriggerHubError;

use crate::config::{Config, TriggerSeed};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .init();

    let engine = AutomationEngine::new(config.engine_config());
    engine.start().await;
    let bind_addr = config.bind_addr();
    seed_triggers(&engine, config.triggers).await?;

    let app = triggerhub_adapter_http_axum::router::build(AppState::new(engine.clone()));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(%bind_addr, "triggerhubd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    engine.shutdown().await;
    tracing::info!("triggerhubd stopped");
    Ok(())
}

async fn seed_triggers(
    engine: &AutomationEngine,
    seeds: Vec<TriggerSeed>,
) -> Result<(), TriggerHubError> {
    for seed in seeds {
        let (event, actions, options) = seed.into_registration();
        let id = engine.register_trigger(event, actions, options).await?;
        tracing::debug!(%id, "configured trigger registered");
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(%err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(%err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
