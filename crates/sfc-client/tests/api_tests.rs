//! Integration tests for the SFC client API

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use intent_core::reference::seed;
use intent_core::{HealthState, MemStore, ReferenceClient, Store};
use sfc_client::api::{create_router, load_schema, AppState};
use sfc_client::SfcClientClient;

const BASE: &str = "/v2/projects/p/composite-apps/ca/v1/deployment-intent-groups/dig/network-controller-intent";

async fn setup_app() -> Router {
    let store: Arc<dyn Store> = MemStore::new();
    seed::register_deployment_chain(&store, "p", "ca", "v1", "dig")
        .await
        .unwrap();
    seed::register_net_control_intent(&store, "p", "ca", "v1", "dig", "nci")
        .await
        .unwrap();

    let refs = ReferenceClient::new(store.clone());
    let health = HealthState::new();
    health.set_ready(true).await;

    create_router(AppState {
        clients: Arc::new(SfcClientClient::new(store, refs)),
        schema: Arc::new(load_schema(None).unwrap()),
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

fn client_body(name: &str) -> Value {
    json!({
        "metadata": {"name": name},
        "spec": {
            "chainEnd": "left",
            "chainName": "chain-1",
            "chainCompositeApp": "chain-ca",
            "chainCompositeAppVersion": "v2",
            "chainDeploymentIntentGroup": "chain-dig",
            "chainNetControlIntent": "chain-nci",
            "appName": "a1",
            "workloadResource": "dep-1",
            "resourceType": "deployment"
        }
    })
}

#[tokio::test]
async fn test_create_under_missing_nci_then_existing() {
    let app = setup_app().await;

    let (status, body) = request(
        &app,
        "POST",
        &format!("{BASE}/nciX/sfc-clients"),
        Some(client_body("s1")),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("NetControlIntent"));

    let url = format!("{BASE}/nci/sfc-clients");
    let (status, echoed) = request(&app, "POST", &url, Some(client_body("s1"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(echoed["metadata"]["name"], "s1");

    let (status, _) = request(&app, "POST", &url, Some(client_body("s1"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_item_crud_and_name_query() {
    let app = setup_app().await;
    let url = format!("{BASE}/nci/sfc-clients");
    request(&app, "POST", &url, Some(client_body("s1"))).await;
    request(&app, "POST", &url, Some(client_body("s2"))).await;

    let (status, listed) = request(&app, "GET", &url, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 2);

    let (status, one) = request(&app, "GET", &format!("{url}?sfc-client=s2"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(one["metadata"]["name"], "s2");

    let item = format!("{url}/s1");
    let (status, fetched) = request(&app, "GET", &item, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["spec"]["chainEnd"], "left");

    // PUT with a mismatched name is rejected before any store access.
    let (status, _) = request(&app, "PUT", &item, Some(client_body("s9"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut updated = client_body("s1");
    updated["spec"]["chainEnd"] = json!("right");
    let (status, echoed) = request(&app, "PUT", &item, Some(updated)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(echoed["spec"]["chainEnd"], "right");

    let (status, _) = request(&app, "DELETE", &item, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = request(&app, "GET", &item, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_empty_name_query_falls_back_to_listing() {
    let app = setup_app().await;
    let url = format!("{BASE}/nci/sfc-clients");
    request(&app, "POST", &url, Some(client_body("s1"))).await;
    request(&app, "POST", &url, Some(client_body("s2"))).await;

    // `?sfc-client=` carries no usable name; it must behave like the plain
    // collection GET, not match an arbitrary sibling.
    let (status, listed) = request(&app, "GET", &format!("{url}?sfc-client="), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_invalid_chain_end_is_rejected_by_schema() {
    let app = setup_app().await;
    let mut body = client_body("s1");
    body["spec"]["chainEnd"] = json!("middle");

    let (status, _) = request(&app, "POST", &format!("{BASE}/nci/sfc-clients"), Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_bulk_delete() {
    let app = setup_app().await;
    let url = format!("{BASE}/nci/sfc-clients");
    request(&app, "POST", &url, Some(client_body("s1"))).await;
    request(&app, "POST", &url, Some(client_body("s2"))).await;

    let (status, _) = request(&app, "DELETE", &url, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, listed) = request(&app, "GET", &url, None).await;
    assert!(listed.as_array().unwrap().is_empty());
}
