//! Integration tests for the HPA placement API
//!
//! Drives the real router over an in-memory store seeded with the
//! orchestrator rows the intents hang off.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use hpa_plc::api::{create_router, AppState, HpaSchemas};
use hpa_plc::{HpaConsumerClient, HpaIntentClient, HpaResourceClient};
use intent_core::reference::seed;
use intent_core::{HealthState, MemStore, ReferenceClient, Store};

const BASE: &str = "/v2/projects/p/composite-apps/ca/v1/deployment-intent-groups/dig";

async fn setup_app() -> Router {
    let store: Arc<dyn Store> = MemStore::new();
    seed::register_deployment_chain(&store, "p", "ca", "v1", "dig")
        .await
        .unwrap();

    let refs = ReferenceClient::new(store.clone());
    let health = HealthState::new();
    health.set_ready(true).await;

    create_router(AppState {
        intents: Arc::new(HpaIntentClient::new(store.clone(), refs.clone())),
        consumers: Arc::new(HpaConsumerClient::new(store.clone(), refs.clone())),
        resources: Arc::new(HpaResourceClient::new(store, refs)),
        schemas: Arc::new(HpaSchemas::load(None).unwrap()),
        health,
    })
}

async fn request(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    let request = match body {
        Some(v) => builder.body(Body::from(v.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn intent_body(name: &str) -> Value {
    json!({"metadata": {"name": name}, "spec": {"app-name": "a1"}})
}

fn consumer_body(name: &str) -> Value {
    json!({
        "metadata": {"name": name},
        "spec": {"replicas": 1, "name": "dep-1", "container-name": "cont-1"}
    })
}

#[tokio::test]
async fn test_create_intent_echoes_and_repeats_conflict() {
    let app = setup_app().await;
    let url = format!("{BASE}/hpa-intents");

    let (status, body) = request(&app, "POST", &url, Some(intent_body("i1"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["metadata"]["name"], "i1");
    assert_eq!(body["spec"]["app-name"], "a1");

    let (status, body) = request(&app, "POST", &url, Some(intent_body("i1"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("already exists"));
}

#[tokio::test]
async fn test_create_under_missing_project_is_404_naming_the_project() {
    let app = setup_app().await;
    let url = "/v2/projects/p1/composite-apps/ca/v1/deployment-intent-groups/dig/hpa-intents";

    let (status, body) = request(&app, "POST", url, Some(intent_body("i1"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("project"));
}

#[tokio::test]
async fn test_consumer_create_and_absent_intent_404() {
    let app = setup_app().await;
    request(&app, "POST", &format!("{BASE}/hpa-intents"), Some(intent_body("i1"))).await;

    let url = format!("{BASE}/hpa-intents/i1/hpa-resource-consumers");
    let (status, _) = request(&app, "POST", &url, Some(consumer_body("c1"))).await;
    assert_eq!(status, StatusCode::CREATED);

    let url = format!("{BASE}/hpa-intents/iX/hpa-resource-consumers");
    let (status, body) = request(&app, "POST", &url, Some(consumer_body("c1"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("intent-name"));
}

#[tokio::test]
async fn test_requests_above_limits_is_400() {
    let app = setup_app().await;
    request(&app, "POST", &format!("{BASE}/hpa-intents"), Some(intent_body("i1"))).await;
    request(
        &app,
        "POST",
        &format!("{BASE}/hpa-intents/i1/hpa-resource-consumers"),
        Some(consumer_body("c1")),
    )
    .await;

    let url = format!("{BASE}/hpa-intents/i1/hpa-resource-consumers/c1/resource-requirements");
    let body = json!({
        "metadata": {"name": "r1"},
        "spec": {"allocatable": true, "resource": {"name": "cpu", "requests": 3, "limits": 2}}
    });
    let (status, _) = request(&app, "POST", &url, Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_non_allocatable_without_container_name_is_created() {
    let app = setup_app().await;
    request(&app, "POST", &format!("{BASE}/hpa-intents"), Some(intent_body("i1"))).await;
    // Consumer without a container name; deployment name is still present.
    let consumer = json!({
        "metadata": {"name": "c1"},
        "spec": {"replicas": 1, "name": "dep-1"}
    });
    request(
        &app,
        "POST",
        &format!("{BASE}/hpa-intents/i1/hpa-resource-consumers"),
        Some(consumer),
    )
    .await;

    let url = format!("{BASE}/hpa-intents/i1/hpa-resource-consumers/c1/resource-requirements");
    let body = json!({
        "metadata": {"name": "r1"},
        "spec": {"allocatable": false, "resource": {"key": "vpu", "value": "yes"}}
    });
    let (status, _) = request(&app, "POST", &url, Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_full_resource_crud_lifecycle() {
    let app = setup_app().await;
    request(&app, "POST", &format!("{BASE}/hpa-intents"), Some(intent_body("i1"))).await;
    request(
        &app,
        "POST",
        &format!("{BASE}/hpa-intents/i1/hpa-resource-consumers"),
        Some(consumer_body("c1")),
    )
    .await;

    let collection = format!("{BASE}/hpa-intents/i1/hpa-resource-consumers/c1/resource-requirements");
    let item = format!("{collection}/r1");
    let body = json!({
        "metadata": {"name": "r1"},
        "spec": {"allocatable": true, "resource": {"name": "cpu", "requests": 1, "limits": 2}}
    });

    let (status, _) = request(&app, "POST", &collection, Some(body.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, fetched) = request(&app, "GET", &item, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["spec"]["resource"]["requests"], 1);

    // PUT with a mismatched body name never reaches the store.
    let mut renamed = body.clone();
    renamed["metadata"]["name"] = json!("r2");
    let (status, _) = request(&app, "PUT", &item, Some(renamed)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut updated = body.clone();
    updated["spec"]["resource"]["limits"] = json!(4);
    let (status, echoed) = request(&app, "PUT", &item, Some(updated)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(echoed["spec"]["resource"]["limits"], 4);

    let (status, _) = request(&app, "DELETE", &item, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = request(&app, "DELETE", &item, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_name_with_equals_sign_is_rejected_by_schema() {
    let app = setup_app().await;
    let url = format!("{BASE}/hpa-intents");
    let (status, _) = request(&app, "POST", &url, Some(intent_body("test=intent"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_empty_and_malformed_bodies() {
    let app = setup_app().await;
    let url = format!("{BASE}/hpa-intents");

    let (status, _) = request(&app, "POST", &url, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let req = Request::builder()
        .method("POST")
        .uri(url)
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_collection_get_lists_and_query_param_gets_one() {
    let app = setup_app().await;
    let url = format!("{BASE}/hpa-intents");
    request(&app, "POST", &url, Some(intent_body("i1"))).await;
    request(&app, "POST", &url, Some(intent_body("i2"))).await;

    let (status, listed) = request(&app, "GET", &url, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 2);

    let (status, one) = request(&app, "GET", &format!("{url}?intent=i2"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(one["metadata"]["name"], "i2");

    let (status, _) = request(&app, "GET", &format!("{url}?intent=iX"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_empty_name_query_falls_back_to_listing() {
    let app = setup_app().await;
    let url = format!("{BASE}/hpa-intents");
    request(&app, "POST", &url, Some(intent_body("i1"))).await;
    request(&app, "POST", &url, Some(intent_body("i2"))).await;

    // `?intent=` carries no usable name; it must behave like the plain
    // collection GET, not match an arbitrary sibling.
    let (status, listed) = request(&app, "GET", &format!("{url}?intent="), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 2);

    request(
        &app,
        "POST",
        &format!("{BASE}/hpa-intents/i1/hpa-resource-consumers"),
        Some(consumer_body("c1")),
    )
    .await;
    let (status, listed) = request(
        &app,
        "GET",
        &format!("{BASE}/hpa-intents/i1/hpa-resource-consumers?consumer="),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_deleting_intent_with_consumers_conflicts() {
    let app = setup_app().await;
    request(&app, "POST", &format!("{BASE}/hpa-intents"), Some(intent_body("i1"))).await;
    request(
        &app,
        "POST",
        &format!("{BASE}/hpa-intents/i1/hpa-resource-consumers"),
        Some(consumer_body("c1")),
    )
    .await;

    let (status, body) = request(&app, "DELETE", &format!("{BASE}/hpa-intents/i1"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("conflict"));

    let (status, _) = request(
        &app,
        "DELETE",
        &format!("{BASE}/hpa-intents/i1/hpa-resource-consumers/c1"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = request(&app, "DELETE", &format!("{BASE}/hpa-intents/i1"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_bulk_delete_empties_a_collection() {
    let app = setup_app().await;
    let url = format!("{BASE}/hpa-intents");
    request(&app, "POST", &url, Some(intent_body("i1"))).await;
    request(&app, "POST", &url, Some(intent_body("i2"))).await;

    let (status, _) = request(&app, "DELETE", &url, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, listed) = request(&app, "GET", &url, None).await;
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_bulk_delete_aborts_on_child_conflict() {
    let app = setup_app().await;
    let url = format!("{BASE}/hpa-intents");
    request(&app, "POST", &url, Some(intent_body("i1"))).await;
    request(&app, "POST", &url, Some(intent_body("i2"))).await;
    request(
        &app,
        "POST",
        &format!("{BASE}/hpa-intents/i1/hpa-resource-consumers"),
        Some(consumer_body("c1")),
    )
    .await;

    // i1 still has a consumer, so the sweep stops there and surfaces the
    // conflict; nothing is rolled back and both intents survive.
    let (status, body) = request(&app, "DELETE", &url, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("conflict"));

    let (status, listed) = request(&app, "GET", &url, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_health_endpoints_respond() {
    let app = setup_app().await;
    let (status, body) = request(&app, "GET", "/healthz", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = request(&app, "GET", "/readyz", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ready"], true);
}
