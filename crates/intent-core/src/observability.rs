//! Request metrics for the controller servers
//!
//! Prometheus counters in the default registry, registered once through a
//! process-wide `OnceLock`. An axum middleware observes every request; the
//! `/metrics` endpoint renders the registry in text format.

use std::sync::OnceLock;

use axum::extract::{MatchedPath, Request};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

static GLOBAL_METRICS: OnceLock<ControllerMetricsInner> = OnceLock::new();

struct ControllerMetricsInner {
    api_requests: IntCounterVec,
}

impl ControllerMetricsInner {
    fn new() -> Self {
        Self {
            api_requests: register_int_counter_vec!(
                "intent_api_requests_total",
                "API requests served, by resource kind, method and response status",
                &["resource", "method", "status"]
            )
            .expect("Failed to register intent_api_requests_total"),
        }
    }
}

/// Handle to the process-wide controller metrics
#[derive(Clone, Default)]
pub struct ControllerMetrics;

impl ControllerMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(ControllerMetricsInner::new);
        Self
    }

    pub fn observe_request(&self, resource: &str, method: &str, status: u16) {
        if let Some(inner) = GLOBAL_METRICS.get() {
            inner
                .api_requests
                .with_label_values(&[resource, method, &status.to_string()])
                .inc();
        }
    }
}

/// Resource kind from a route template: the last literal segment, so both
/// the collection and item routes of a kind share one label value.
fn resource_label(route: &str) -> &str {
    route
        .rsplit('/')
        .find(|seg| !seg.is_empty() && !seg.starts_with(':'))
        .unwrap_or("unknown")
}

/// Count every request by resource kind, method and status
pub async fn track_requests(req: Request, next: Next) -> Response {
    let resource = req
        .extensions()
        .get::<MatchedPath>()
        .map(|m| resource_label(m.as_str()).to_owned())
        .unwrap_or_else(|| "unknown".to_owned());
    let method = req.method().to_string();
    let response = next.run(req).await;
    ControllerMetrics::new().observe_request(&resource, &method, response.status().as_u16());
    response
}

/// Prometheus text-format endpoint
pub async fn metrics_handler() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encoding failed: {e}"),
        )
            .into_response();
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
        .into_response()
}
