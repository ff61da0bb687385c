//! HPA placement controller
//!
//! Stores the three-level intent tree - intent -> resource-consumer ->
//! resource-requirement - beneath deployment intent groups owned by the
//! orchestrator, and exposes it as a hierarchical REST API.

pub mod api;
pub mod config;
pub mod consumer;
pub mod intent;
pub mod model;
pub mod resource;

/// Collection holding this controller's documents
pub const COLLECTION: &str = "hpaplacement";

/// Tag under which intent payloads are stored
pub const TAG: &str = "HpaPlacementControllerMetadata";

pub use api::{create_router, serve, AppState, HpaSchemas};
pub use consumer::{HpaConsumerClient, HpaConsumerManager};
pub use intent::{HpaIntentClient, HpaIntentManager};
pub use resource::{HpaResourceClient, HpaResourceManager};
