//! SFC client controller entry point

use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use intent_core::{
    ControllerMetrics, HealthState, MemStore, ReferenceClient, ServiceRegistration, Store,
};
use sfc_client::api::{self, AppState};
use sfc_client::config::ControllerConfig;
use sfc_client::SfcClientClient;

const REGISTRATION: ServiceRegistration = ServiceRegistration {
    name_env: "SFCCLIENT_NAME",
    default_name: "sfcclient",
    default_host: "0.0.0.0",
    default_port: 9058,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting sfc-client");

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

    let schema = Arc::new(api::load_schema(config.schema_dir.as_deref())?);
    let health = HealthState::new();
    let _metrics = ControllerMetrics::new();

    let state = AppState {
        clients: Arc::new(SfcClientClient::new(store, refs)),
        schema,
        health: health.clone(),
    };

    health.set_ready(true).await;

    let api_handle = tokio::spawn(api::serve(config.api_port, state));

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    api_handle.abort();

    Ok(())
}
