//! SFC client controller
//!
//! Records bindings between workloads in this deployment intent group and
//! service-function chains defined in other groups, beneath the
//! network-control-intent the binding belongs to.

pub mod api;
pub mod config;
pub mod model;
pub mod sfc;

/// Collection holding this controller's documents
pub const COLLECTION: &str = "orchestrator";

/// Tag under which intent payloads are stored
pub const TAG: &str = "sfcclientmetadata";

pub use api::{create_router, load_schema, serve, AppState};
pub use sfc::{SfcClientClient, SfcClientManager};
