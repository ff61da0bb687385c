//! Health and readiness state for the controller servers
//!
//! The controllers have exactly one dependency worth tracking: the document
//! store. `/healthz` reports liveness, `/readyz` flips once the server is
//! wired up and the store is reachable.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Status of the service as a whole
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Healthy,
    Unhealthy,
}

/// Payload for `/healthz`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: ServiceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Payload for `/readyz`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Default)]
struct Inner {
    ready: bool,
    store_error: Option<String>,
}

/// Shared health state, cloneable across handlers
#[derive(Clone, Default)]
pub struct HealthState {
    inner: Arc<RwLock<Inner>>,
}

impl HealthState {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_ready(&self, ready: bool) {
        self.inner.write().await.ready = ready;
    }

    pub async fn set_store_error(&self, message: impl Into<String>) {
        self.inner.write().await.store_error = Some(message.into());
    }

    pub async fn clear_store_error(&self) {
        self.inner.write().await.store_error = None;
    }

    pub async fn health(&self) -> HealthResponse {
        let inner = self.inner.read().await;
        match &inner.store_error {
            Some(msg) => HealthResponse {
                status: ServiceStatus::Unhealthy,
                message: Some(msg.clone()),
            },
            None => HealthResponse {
                status: ServiceStatus::Healthy,
                message: None,
            },
        }
    }

    pub async fn readiness(&self) -> ReadinessResponse {
        let inner = self.inner.read().await;
        if !inner.ready {
            return ReadinessResponse {
                ready: false,
                reason: Some("server still starting".to_string()),
            };
        }
        match &inner.store_error {
            Some(msg) => ReadinessResponse {
                ready: false,
                reason: Some(msg.clone()),
            },
            None => ReadinessResponse {
                ready: true,
                reason: None,
            },
        }
    }
}
