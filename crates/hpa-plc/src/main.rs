//! HPA placement controller entry point
//!
//! Serves the intent CRUD API over the shared document store and advertises
//! its service endpoint following the platform naming convention.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use hpa_plc::api::{AppState, HpaSchemas};
use hpa_plc::config::ControllerConfig;
use hpa_plc::{api, HpaConsumerClient, HpaIntentClient, HpaResourceClient};
use intent_core::{
    ControllerMetrics, HealthState, MemStore, ReferenceClient, ServiceRegistration, Store,
};

const REGISTRATION: ServiceRegistration = ServiceRegistration {
    name_env: "HPAPLACEMENT_NAME",
    default_name: "hpaplacement",
    default_host: "0.0.0.0",
    default_port: 9039,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting hpa-plc");

    let config = ControllerConfig::load()?;
    let endpoint = REGISTRATION.resolve();
    info!(
        service = %endpoint.name,
        host = %endpoint.host,
        port = endpoint.port,
        "Controller registration endpoint resolved"
    );

    let store: Arc<dyn Store> = MemStore::new();
    let refs = ReferenceClient::new(store.clone());

    let schemas = Arc::new(HpaSchemas::load(config.schema_dir.as_deref())?);
    let health = HealthState::new();
    let _metrics = ControllerMetrics::new();

    let state = AppState {
        intents: Arc::new(HpaIntentClient::new(store.clone(), refs.clone())),
        consumers: Arc::new(HpaConsumerClient::new(store.clone(), refs.clone())),
        resources: Arc::new(HpaResourceClient::new(store, refs)),
        schemas,
        health: health.clone(),
    };

    health.set_ready(true).await;

    let api_handle = tokio::spawn(api::serve(config.api_port, state));

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    api_handle.abort();

    Ok(())
}
