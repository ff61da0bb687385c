//! HTTP API for the HPA placement controller
//!
//! The URL tree mirrors the resource tree under
//! `/v2/projects/.../deployment-intent-groups/{dig}/hpa-intents/...`.
//! Collection URLs take POST (create), GET (list, or get-by-name via a
//! query parameter) and DELETE (bulk delete); item URLs take GET, PUT and
//! DELETE. Domain errors map themselves to status codes.

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

use crate::consumer::HpaConsumerManager;
use crate::intent::HpaIntentManager;
use crate::model::{
    ConsumerPath, DigPath, HpaIntent, HpaResourceConsumer, HpaResourceRequirement, IntentPath,
};
use crate::resource::HpaResourceManager;

const INTENTS_URL: &str = "/v2/projects/:project/composite-apps/:composite_app/:version/deployment-intent-groups/:deployment_intent_group/hpa-intents";
const INTENT_URL: &str = "/v2/projects/:project/composite-apps/:composite_app/:version/deployment-intent-groups/:deployment_intent_group/hpa-intents/:intent_name";
const CONSUMERS_URL: &str = "/v2/projects/:project/composite-apps/:composite_app/:version/deployment-intent-groups/:deployment_intent_group/hpa-intents/:intent_name/hpa-resource-consumers";
const CONSUMER_URL: &str = "/v2/projects/:project/composite-apps/:composite_app/:version/deployment-intent-groups/:deployment_intent_group/hpa-intents/:intent_name/hpa-resource-consumers/:consumer_name";
const RESOURCES_URL: &str = "/v2/projects/:project/composite-apps/:composite_app/:version/deployment-intent-groups/:deployment_intent_group/hpa-intents/:intent_name/hpa-resource-consumers/:consumer_name/resource-requirements";
const RESOURCE_URL: &str = "/v2/projects/:project/composite-apps/:composite_app/:version/deployment-intent-groups/:deployment_intent_group/hpa-intents/:intent_name/hpa-resource-consumers/:consumer_name/resource-requirements/:resource_name";

/// Compiled schemas for the three resource kinds
pub struct HpaSchemas {
    pub intent: SchemaValidator,
    pub consumer: SchemaValidator,
    pub resource: SchemaValidator,
}

impl HpaSchemas {
    /// Load from a schema directory, or fall back to the compiled-in copies
    pub fn load(dir: Option<&str>) -> Result<Self, IntentError> {
        Ok(Self {
            intent: SchemaValidator::load(
                dir,
                "hpa-intent.json",
                include_str!("../schemas/hpa-intent.json"),
            )?,
            consumer: SchemaValidator::load(
                dir,
                "hpa-consumer.json",
                include_str!("../schemas/hpa-consumer.json"),
            )?,
            resource: SchemaValidator::load(
                dir,
                "hpa-resource.json",
                include_str!("../schemas/hpa-resource.json"),
            )?,
        })
    }
}

/// Shared application state; managers are injected so tests can substitute
/// their own implementations
#[derive(Clone)]
pub struct AppState {
    pub intents: Arc<dyn HpaIntentManager>,
    pub consumers: Arc<dyn HpaConsumerManager>,
    pub resources: Arc<dyn HpaResourceManager>,
    pub schemas: Arc<HpaSchemas>,
    pub health: HealthState,
}

// --- Path variable shapes ---

#[derive(Debug, Deserialize)]
struct DigVars {
    project: String,
    composite_app: String,
    version: String,
    deployment_intent_group: String,
}

impl DigVars {
    fn into_path(self) -> DigPath {
        DigPath {
            project: self.project,
            composite_app: self.composite_app,
            version: self.version,
            deployment_intent_group: self.deployment_intent_group,
        }
    }
}

#[derive(Debug, Deserialize)]
struct IntentVars {
    project: String,
    composite_app: String,
    version: String,
    deployment_intent_group: String,
    intent_name: String,
}

impl IntentVars {
    fn split(self) -> (DigPath, String) {
        (
            DigPath {
                project: self.project,
                composite_app: self.composite_app,
                version: self.version,
                deployment_intent_group: self.deployment_intent_group,
            },
            self.intent_name,
        )
    }

    fn into_intent_path(self) -> IntentPath {
        let (dig, intent) = self.split();
        IntentPath { dig, intent }
    }
}

#[derive(Debug, Deserialize)]
struct ConsumerVars {
    project: String,
    composite_app: String,
    version: String,
    deployment_intent_group: String,
    intent_name: String,
    consumer_name: String,
}

impl ConsumerVars {
    fn split(self) -> (IntentPath, String) {
        (
            IntentPath {
                dig: DigPath {
                    project: self.project,
                    composite_app: self.composite_app,
                    version: self.version,
                    deployment_intent_group: self.deployment_intent_group,
                },
                intent: self.intent_name,
            },
            self.consumer_name,
        )
    }

    fn into_consumer_path(self) -> ConsumerPath {
        let (intent, consumer) = self.split();
        ConsumerPath { intent, consumer }
    }
}

#[derive(Debug, Deserialize)]
struct ResourceVars {
    project: String,
    composite_app: String,
    version: String,
    deployment_intent_group: String,
    intent_name: String,
    consumer_name: String,
    resource_name: String,
}

impl ResourceVars {
    fn split(self) -> (ConsumerPath, String) {
        (
            ConsumerPath {
                intent: IntentPath {
                    dig: DigPath {
                        project: self.project,
                        composite_app: self.composite_app,
                        version: self.version,
                        deployment_intent_group: self.deployment_intent_group,
                    },
                    intent: self.intent_name,
                },
                consumer: self.consumer_name,
            },
            self.resource_name,
        )
    }
}

fn check_name_matches(kind: &str, body_name: &str, url_name: &str) -> Result<(), IntentError> {
    if body_name != url_name {
        return Err(IntentError::Validation(format!(
            "{kind} name {body_name} in the body does not match {url_name} in the URL"
        )));
    }
    Ok(())
}

// --- Intent handlers ---

async fn create_intent(
    State(state): State<AppState>,
    Path(vars): Path<DigVars>,
    body: Bytes,
) -> Result<impl IntoResponse, IntentError> {
    let intent: HpaIntent = decode_body(&body, &state.schemas.intent)?;
    let created = state.intents.add(intent, &vars.into_path(), false).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Debug, Deserialize)]
struct IntentQuery {
    intent: Option<String>,
}

async fn list_intents(
    State(state): State<AppState>,
    Path(vars): Path<DigVars>,
    Query(query): Query<IntentQuery>,
) -> Result<impl IntoResponse, IntentError> {
    let path = vars.into_path();
    // An empty query name means the variable was not really supplied;
    // dispatch to the listing, never to a lookup with an empty key field.
    match query.intent.as_deref() {
        Some(name) if !name.is_empty() => {
            let intent = state.intents.get(name, &path).await?;
            Ok(Json(intent).into_response())
        }
        _ => {
            let intents = state.intents.get_all(&path).await?;
            Ok(Json(intents).into_response())
        }
    }
}

async fn get_intent(
    State(state): State<AppState>,
    Path(vars): Path<IntentVars>,
) -> Result<impl IntoResponse, IntentError> {
    let (path, name) = vars.split();
    let intent = state.intents.get(&name, &path).await?;
    Ok(Json(intent))
}

async fn put_intent(
    State(state): State<AppState>,
    Path(vars): Path<IntentVars>,
    body: Bytes,
) -> Result<impl IntoResponse, IntentError> {
    let intent: HpaIntent = decode_body(&body, &state.schemas.intent)?;
    let (path, name) = vars.split();
    check_name_matches("hpaIntent", &intent.metadata.name, &name)?;
    let updated = state.intents.add(intent, &path, true).await?;
    Ok(Json(updated))
}

async fn delete_intent(
    State(state): State<AppState>,
    Path(vars): Path<IntentVars>,
) -> Result<impl IntoResponse, IntentError> {
    let (path, name) = vars.split();
    state.intents.delete(&name, &path).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_all_intents(
    State(state): State<AppState>,
    Path(vars): Path<DigVars>,
) -> Result<impl IntoResponse, IntentError> {
    state.intents.delete_all(&vars.into_path()).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Consumer handlers ---

async fn create_consumer(
    State(state): State<AppState>,
    Path(vars): Path<IntentVars>,
    body: Bytes,
) -> Result<impl IntoResponse, IntentError> {
    let consumer: HpaResourceConsumer = decode_body(&body, &state.schemas.consumer)?;
    let created = state
        .consumers
        .add(consumer, &vars.into_intent_path(), false)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Debug, Deserialize)]
struct ConsumerQuery {
    consumer: Option<String>,
}

async fn list_consumers(
    State(state): State<AppState>,
    Path(vars): Path<IntentVars>,
    Query(query): Query<ConsumerQuery>,
) -> Result<impl IntoResponse, IntentError> {
    let path = vars.into_intent_path();
    match query.consumer.as_deref() {
        Some(name) if !name.is_empty() => {
            let consumer = state.consumers.get(name, &path).await?;
            Ok(Json(consumer).into_response())
        }
        _ => {
            let consumers = state.consumers.get_all(&path).await?;
            Ok(Json(consumers).into_response())
        }
    }
}

async fn get_consumer(
    State(state): State<AppState>,
    Path(vars): Path<ConsumerVars>,
) -> Result<impl IntoResponse, IntentError> {
    let (path, name) = vars.split();
    let consumer = state.consumers.get(&name, &path).await?;
    Ok(Json(consumer))
}

async fn put_consumer(
    State(state): State<AppState>,
    Path(vars): Path<ConsumerVars>,
    body: Bytes,
) -> Result<impl IntoResponse, IntentError> {
    let consumer: HpaResourceConsumer = decode_body(&body, &state.schemas.consumer)?;
    let (path, name) = vars.split();
    check_name_matches("hpaConsumer", &consumer.metadata.name, &name)?;
    let updated = state.consumers.add(consumer, &path, true).await?;
    Ok(Json(updated))
}

async fn delete_consumer(
    State(state): State<AppState>,
    Path(vars): Path<ConsumerVars>,
) -> Result<impl IntoResponse, IntentError> {
    let (path, name) = vars.split();
    state.consumers.delete(&name, &path).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_all_consumers(
    State(state): State<AppState>,
    Path(vars): Path<IntentVars>,
) -> Result<impl IntoResponse, IntentError> {
    state.consumers.delete_all(&vars.into_intent_path()).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Resource requirement handlers ---

async fn create_resource(
    State(state): State<AppState>,
    Path(vars): Path<ConsumerVars>,
    body: Bytes,
) -> Result<impl IntoResponse, IntentError> {
    let resource: HpaResourceRequirement = decode_body(&body, &state.schemas.resource)?;
    let created = state
        .resources
        .add(resource, &vars.into_consumer_path(), false)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Debug, Deserialize)]
struct ResourceQuery {
    resource: Option<String>,
}

async fn list_resources(
    State(state): State<AppState>,
    Path(vars): Path<ConsumerVars>,
    Query(query): Query<ResourceQuery>,
) -> Result<impl IntoResponse, IntentError> {
    let path = vars.into_consumer_path();
    match query.resource.as_deref() {
        Some(name) if !name.is_empty() => {
            let resource = state.resources.get(name, &path).await?;
            Ok(Json(resource).into_response())
        }
        _ => {
            let resources = state.resources.get_all(&path).await?;
            Ok(Json(resources).into_response())
        }
    }
}

async fn get_resource(
    State(state): State<AppState>,
    Path(vars): Path<ResourceVars>,
) -> Result<impl IntoResponse, IntentError> {
    let (path, name) = vars.split();
    let resource = state.resources.get(&name, &path).await?;
    Ok(Json(resource))
}

async fn put_resource(
    State(state): State<AppState>,
    Path(vars): Path<ResourceVars>,
    body: Bytes,
) -> Result<impl IntoResponse, IntentError> {
    let resource: HpaResourceRequirement = decode_body(&body, &state.schemas.resource)?;
    let (path, name) = vars.split();
    check_name_matches("hpaResource", &resource.metadata.name, &name)?;
    let updated = state.resources.add(resource, &path, true).await?;
    Ok(Json(updated))
}

async fn delete_resource(
    State(state): State<AppState>,
    Path(vars): Path<ResourceVars>,
) -> Result<impl IntoResponse, IntentError> {
    let (path, name) = vars.split();
    state.resources.delete(&name, &path).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_all_resources(
    State(state): State<AppState>,
    Path(vars): Path<ConsumerVars>,
) -> Result<impl IntoResponse, IntentError> {
    state
        .resources
        .delete_all(&vars.into_consumer_path())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Health ---

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
            INTENTS_URL,
            axum::routing::post(create_intent)
                .get(list_intents)
                .delete(delete_all_intents),
        )
        .route(
            INTENT_URL,
            get(get_intent).put(put_intent).delete(delete_intent),
        )
        .route(
            CONSUMERS_URL,
            axum::routing::post(create_consumer)
                .get(list_consumers)
                .delete(delete_all_consumers),
        )
        .route(
            CONSUMER_URL,
            get(get_consumer).put(put_consumer).delete(delete_consumer),
        )
        .route(
            RESOURCES_URL,
            axum::routing::post(create_resource)
                .get(list_resources)
                .delete(delete_all_resources),
        )
        .route(
            RESOURCE_URL,
            get(get_resource).put(put_resource).delete(delete_resource),
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
    info!(addr = %addr, "Starting HPA placement API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
