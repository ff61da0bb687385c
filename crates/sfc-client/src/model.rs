//! Resource model and key tuple for the SFC client controller
//!
//! An SFC client intent binds a workload in this deployment intent group to
//! one end of a service-function chain defined elsewhere. The chain-side
//! references are informational: they are stored as given and verified by
//! downstream compilation, not here.

use intent_core::Metadata;
use serde::{Deserialize, Serialize};

/// Which side of the chain the workload attaches to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainEnd {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SfcClientIntent {
    pub metadata: Metadata,
    pub spec: SfcClientIntentSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SfcClientIntentSpec {
    pub chain_end: ChainEnd,
    pub chain_name: String,
    pub chain_composite_app: String,
    pub chain_composite_app_version: String,
    pub chain_deployment_intent_group: String,
    pub chain_net_control_intent: String,
    pub app_name: String,
    pub workload_resource: String,
    pub resource_type: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SfcClientIntentKey {
    pub project: String,
    pub composite_app: String,
    pub composite_app_version: String,
    pub deployment_intent_group: String,
    pub net_controller_intent: String,
    pub sfc_client_intent: String,
}

/// Ancestors of an SFC client intent: the deployment chain plus the
/// network-control-intent it lives under
#[derive(Debug, Clone)]
pub struct NetControlIntentPath {
    pub project: String,
    pub composite_app: String,
    pub version: String,
    pub deployment_intent_group: String,
    pub net_control_intent: String,
}

impl NetControlIntentPath {
    pub fn intent_key(&self, name: &str) -> SfcClientIntentKey {
        SfcClientIntentKey {
            project: self.project.clone(),
            composite_app: self.composite_app.clone(),
            composite_app_version: self.version.clone(),
            deployment_intent_group: self.deployment_intent_group.clone(),
            net_controller_intent: self.net_control_intent.clone(),
            sfc_client_intent: name.to_string(),
        }
    }
}
