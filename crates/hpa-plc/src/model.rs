//! Resource models and key tuples for the HPA placement controller
//!
//! Three owned levels hang off the deployment-intent-group: intent ->
//! resource-consumer -> resource-requirement. Spec fields use the kebab-case
//! wire names of the intent API.

use intent_core::Metadata;
use serde::{Deserialize, Serialize};

/// Names an application within a deployment intent group that needs HPA
/// placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HpaIntent {
    pub metadata: Metadata,
    pub spec: HpaIntentSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HpaIntentSpec {
    #[serde(rename = "app-name")]
    pub app_name: String,
}

/// A workload inside the application consuming HPA resources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HpaResourceConsumer {
    pub metadata: Metadata,
    pub spec: HpaConsumerSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HpaConsumerSpec {
    #[serde(default, rename = "api-version", skip_serializing_if = "String::is_empty")]
    pub api_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    pub replicas: i32,
    /// Deployment-like object name the consumer scales
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, rename = "container-name", skip_serializing_if = "String::is_empty")]
    pub container_name: String,
}

/// A single allocatable or non-allocatable requirement under a consumer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HpaResourceRequirement {
    pub metadata: Metadata,
    pub spec: HpaResourceSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HpaResourceSpec {
    /// Required tri-state: the schema rejects bodies that omit it
    pub allocatable: bool,
    #[serde(default)]
    pub mandatory: bool,
    #[serde(default)]
    pub weight: i32,
    pub resource: ResourceBody,
}

/// Exactly one of the two shapes, matching the `allocatable` flag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceBody {
    Allocatable(AllocatableResource),
    NonAllocatable(NonAllocatableResource),
}

/// A countable compute resource with requests and limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocatableResource {
    pub name: String,
    pub requests: i64,
    /// `0` means unbounded
    #[serde(default)]
    pub limits: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub units: String,
}

/// A node-label predicate expressed as a key/value pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NonAllocatableResource {
    pub key: String,
    pub value: String,
}

// --- Key tuples ---

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HpaIntentKey {
    pub project: String,
    pub composite_app: String,
    pub composite_app_version: String,
    pub deployment_intent_group: String,
    pub hpa_intent: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HpaConsumerKey {
    pub project: String,
    pub composite_app: String,
    pub composite_app_version: String,
    pub deployment_intent_group: String,
    pub hpa_intent: String,
    pub hpa_consumer: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HpaResourceKey {
    pub project: String,
    pub composite_app: String,
    pub composite_app_version: String,
    pub deployment_intent_group: String,
    pub hpa_intent: String,
    pub hpa_consumer: String,
    pub hpa_resource: String,
}

// --- Ancestor paths ---

/// Ancestors of an intent: the externally owned deployment chain
#[derive(Debug, Clone)]
pub struct DigPath {
    pub project: String,
    pub composite_app: String,
    pub version: String,
    pub deployment_intent_group: String,
}

impl DigPath {
    pub fn intent_key(&self, intent: &str) -> HpaIntentKey {
        HpaIntentKey {
            project: self.project.clone(),
            composite_app: self.composite_app.clone(),
            composite_app_version: self.version.clone(),
            deployment_intent_group: self.deployment_intent_group.clone(),
            hpa_intent: intent.to_string(),
        }
    }
}

/// Ancestors of a consumer: the deployment chain plus the owning intent
#[derive(Debug, Clone)]
pub struct IntentPath {
    pub dig: DigPath,
    pub intent: String,
}

impl IntentPath {
    pub fn intent_key(&self) -> HpaIntentKey {
        self.dig.intent_key(&self.intent)
    }

    pub fn consumer_key(&self, consumer: &str) -> HpaConsumerKey {
        HpaConsumerKey {
            project: self.dig.project.clone(),
            composite_app: self.dig.composite_app.clone(),
            composite_app_version: self.dig.version.clone(),
            deployment_intent_group: self.dig.deployment_intent_group.clone(),
            hpa_intent: self.intent.clone(),
            hpa_consumer: consumer.to_string(),
        }
    }
}

/// Ancestors of a resource requirement: chain, intent and consumer
#[derive(Debug, Clone)]
pub struct ConsumerPath {
    pub intent: IntentPath,
    pub consumer: String,
}

impl ConsumerPath {
    pub fn consumer_key(&self) -> HpaConsumerKey {
        self.intent.consumer_key(&self.consumer)
    }

    pub fn resource_key(&self, resource: &str) -> HpaResourceKey {
        HpaResourceKey {
            project: self.intent.dig.project.clone(),
            composite_app: self.intent.dig.composite_app.clone(),
            composite_app_version: self.intent.dig.version.clone(),
            deployment_intent_group: self.intent.dig.deployment_intent_group.clone(),
            hpa_intent: self.intent.intent.clone(),
            hpa_consumer: self.consumer.clone(),
            hpa_resource: resource.to_string(),
        }
    }
}
