//! Shared engine for the intent controllers
//!
//! This crate provides the pieces every controller is built from:
//! - Document-store adapter and in-memory reference store
//! - Deterministic key encoding with prefix queries
//! - Ancestor (referential-integrity) verification
//! - JSON-schema request validation
//! - Error taxonomy with HTTP status mapping
//! - Service registration, health and request metrics plumbing

pub mod crud;
pub mod error;
pub mod health;
pub mod key;
pub mod model;
pub mod observability;
pub mod reference;
pub mod registration;
pub mod schema;
pub mod store;

pub use error::IntentError;
pub use health::{HealthResponse, HealthState, ReadinessResponse, ServiceStatus};
pub use model::Metadata;
pub use observability::ControllerMetrics;
pub use reference::ReferenceClient;
pub use registration::{ServiceEndpoint, ServiceRegistration};
pub use schema::{decode_body, SchemaValidator};
pub use store::{unmarshal, ClientDbInfo, MemStore, Store, StoreError};
