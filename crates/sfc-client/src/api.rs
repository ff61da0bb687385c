//! HTTP API for the SFC client controller

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{middleware, Json, Router};
use serde::Deserialize;
use tracing::info;

use intent_core::observability::{metrics_handler, track_requests};
use intent_core::{decode_body, HealthState, IntentError, SchemaValidator};

use crate::model::{NetControlIntentPath, SfcClientIntent};
use crate::sfc::SfcClientManager;

const CLIENTS_URL: &str = "/v2/projects/:project/composite-apps/:composite_app/:version/deployment-intent-groups/:deployment_intent_group/network-controller-intent/:net_control_intent/sfc-clients";
const CLIENT_URL: &str = "/v2/projects/:project/composite-apps/:composite_app/:version/deployment-intent-groups/:deployment_intent_group/network-controller-intent/:net_control_intent/sfc-clients/:sfc_client_name";

/// Shared application state; the manager is injected so tests can
/// substitute their own implementation
#[derive(Clone)]
pub struct AppState {
    pub clients: Arc<dyn SfcClientManager>,
    pub schema: Arc<SchemaValidator>,
    pub health: HealthState,
}

/// Load the intent schema from a directory, or the compiled-in copy
pub fn load_schema(dir: Option<&str>) -> Result<SchemaValidator, IntentError> {
    SchemaValidator::load(dir, "sfc-client.json", include_str!("../schemas/sfc-client.json"))
}

#[derive(Debug, Deserialize)]
struct NciVars {
    project: String,
    composite_app: String,
    version: String,
    deployment_intent_group: String,
    net_control_intent: String,
}

impl NciVars {
    fn into_path(self) -> NetControlIntentPath {
        NetControlIntentPath {
            project: self.project,
            composite_app: self.composite_app,
            version: self.version,
            deployment_intent_group: self.deployment_intent_group,
            net_control_intent: self.net_control_intent,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ClientVars {
    project: String,
    composite_app: String,
    version: String,
    deployment_intent_group: String,
    net_control_intent: String,
    sfc_client_name: String,
}

impl ClientVars {
    fn split(self) -> (NetControlIntentPath, String) {
        (
            NetControlIntentPath {
                project: self.project,
                composite_app: self.composite_app,
                version: self.version,
                deployment_intent_group: self.deployment_intent_group,
                net_control_intent: self.net_control_intent,
            },
            self.sfc_client_name,
        )
    }
}

async fn create_client(
    State(state): State<AppState>,
    Path(vars): Path<NciVars>,
    body: Bytes,
) -> Result<impl IntoResponse, IntentError> {
    let intent: SfcClientIntent = decode_body(&body, &state.schema)?;
    let created = state.clients.add(intent, &vars.into_path(), false).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Debug, Deserialize)]
struct ClientQuery {
    #[serde(rename = "sfc-client")]
    sfc_client: Option<String>,
}

async fn list_clients(
    State(state): State<AppState>,
    Path(vars): Path<NciVars>,
    Query(query): Query<ClientQuery>,
) -> Result<impl IntoResponse, IntentError> {
    let path = vars.into_path();
    // An empty query name means the variable was not really supplied;
    // dispatch to the listing, never to a lookup with an empty key field.
    match query.sfc_client.as_deref() {
        Some(name) if !name.is_empty() => {
            let intent = state.clients.get(name, &path).await?;
            Ok(Json(intent).into_response())
        }
        _ => {
            let intents = state.clients.get_all(&path).await?;
            Ok(Json(intents).into_response())
        }
    }
}

async fn get_client(
    State(state): State<AppState>,
    Path(vars): Path<ClientVars>,
) -> Result<impl IntoResponse, IntentError> {
    let (path, name) = vars.split();
    let intent = state.clients.get(&name, &path).await?;
    Ok(Json(intent))
}

async fn put_client(
    State(state): State<AppState>,
    Path(vars): Path<ClientVars>,
    body: Bytes,
) -> Result<impl IntoResponse, IntentError> {
    let intent: SfcClientIntent = decode_body(&body, &state.schema)?;
    let (path, name) = vars.split();
    if intent.metadata.name != name {
        return Err(IntentError::Validation(format!(
            "sfcClientIntent name {} in the body does not match {} in the URL",
            intent.metadata.name, name
        )));
    }
    let updated = state.clients.add(intent, &path, true).await?;
    Ok(Json(updated))
}

async fn delete_client(
    State(state): State<AppState>,
    Path(vars): Path<ClientVars>,
) -> Result<impl IntoResponse, IntentError> {
    let (path, name) = vars.split();
    state.clients.delete(&name, &path).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_all_clients(
    State(state): State<AppState>,
    Path(vars): Path<NciVars>,
) -> Result<impl IntoResponse, IntentError> {
    state.clients.delete_all(&vars.into_path()).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn healthz(State(state): State<AppState>) -> impl IntoResponse {
    let health = state.health.health().await;
    let status = match health.status {
        intent_core::ServiceStatus::Healthy => StatusCode::OK,
        intent_core::ServiceStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status, Json(health))
}

async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    let readiness = state.health.readiness().await;
    let status = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(readiness))
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(
            CLIENTS_URL,
            axum::routing::post(create_client)
                .get(list_clients)
                .delete(delete_all_clients),
        )
        .route(
            CLIENT_URL,
            get(get_client).put(put_client).delete(delete_client),
        )
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics_handler))
        .layer(middleware::from_fn(track_requests))
        .with_state(state)
}

/// Start the API server
pub async fn serve(port: u16, state: AppState) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting SFC client API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
