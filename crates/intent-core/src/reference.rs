//! Ancestor verification against the orchestrator's resource rows
//!
//! Every owned resource hangs off a chain of ancestors owned by the
//! external orchestrator (project / composite-app / deployment-intent-group,
//! plus the network-control-intent for chain resources). The orchestrator
//! shares the document store, so verification is a read of the ancestor's
//! row. Each hop fails fast with a message naming the missing level, which
//! handlers surface verbatim in 404 responses.
//!
//! All checks are side-effect free and run on every mutation.

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;

use crate::error::IntentError;
use crate::key::StoreKey;
use crate::store::{Store, StoreError};

/// Collection holding the orchestrator-owned rows
pub const ORCHESTRATOR_COLLECTION: &str = "orchestrator";

const PROJECT_TAG: &str = "projectmetadata";
const COMPOSITE_APP_TAG: &str = "compositeappmetadata";
const DIG_TAG: &str = "deploymentintentgroupmetadata";
const NET_CONTROL_INTENT_TAG: &str = "netcontrolintentmetadata";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectKey {
    pub project: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeAppKey {
    pub project: String,
    pub composite_app: String,
    pub composite_app_version: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentIntentGroupKey {
    pub project: String,
    pub composite_app: String,
    pub composite_app_version: String,
    pub deployment_intent_group: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetControlIntentKey {
    pub project: String,
    pub composite_app: String,
    pub composite_app_version: String,
    pub deployment_intent_group: String,
    pub net_controller_intent: String,
}

/// Read-only client for ancestor existence checks
#[derive(Clone)]
pub struct ReferenceClient {
    store: Arc<dyn Store>,
}

impl ReferenceClient {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    async fn exists(&self, key: &impl StoreKey, tag: &str) -> Result<bool, IntentError> {
        let key = key.key_value()?;
        match self.store.find(ORCHESTRATOR_COLLECTION, &key, tag).await {
            Ok(docs) => Ok(!docs.is_empty()),
            Err(StoreError::NotFound) => Ok(false),
            Err(e) => Err(IntentError::Db(e.to_string())),
        }
    }

    pub async fn project_exists(&self, project: &str) -> Result<bool, IntentError> {
        self.exists(
            &ProjectKey {
                project: project.to_string(),
            },
            PROJECT_TAG,
        )
        .await
    }

    pub async fn composite_app_exists(
        &self,
        project: &str,
        composite_app: &str,
        version: &str,
    ) -> Result<bool, IntentError> {
        self.exists(
            &CompositeAppKey {
                project: project.to_string(),
                composite_app: composite_app.to_string(),
                composite_app_version: version.to_string(),
            },
            COMPOSITE_APP_TAG,
        )
        .await
    }

    pub async fn deployment_intent_group_exists(
        &self,
        project: &str,
        composite_app: &str,
        version: &str,
        deployment_intent_group: &str,
    ) -> Result<bool, IntentError> {
        self.exists(
            &DeploymentIntentGroupKey {
                project: project.to_string(),
                composite_app: composite_app.to_string(),
                composite_app_version: version.to_string(),
                deployment_intent_group: deployment_intent_group.to_string(),
            },
            DIG_TAG,
        )
        .await
    }

    pub async fn net_control_intent_exists(
        &self,
        project: &str,
        composite_app: &str,
        version: &str,
        deployment_intent_group: &str,
        net_control_intent: &str,
    ) -> Result<bool, IntentError> {
        self.exists(
            &NetControlIntentKey {
                project: project.to_string(),
                composite_app: composite_app.to_string(),
                composite_app_version: version.to_string(),
                deployment_intent_group: deployment_intent_group.to_string(),
                net_controller_intent: net_control_intent.to_string(),
            },
            NET_CONTROL_INTENT_TAG,
        )
        .await
    }

    /// Walk project -> composite-app -> deployment-intent-group, failing
    /// fast with a message that names the first missing level.
    pub async fn check_deployment_chain(
        &self,
        project: &str,
        composite_app: &str,
        version: &str,
        deployment_intent_group: &str,
    ) -> Result<(), IntentError> {
        if !self.project_exists(project).await? {
            return Err(IntentError::DependencyMissing(
                "Unable to find the project".to_string(),
            ));
        }
        if !self
            .composite_app_exists(project, composite_app, version)
            .await?
        {
            return Err(IntentError::DependencyMissing(
                "Unable to find the composite-app".to_string(),
            ));
        }
        if !self
            .deployment_intent_group_exists(project, composite_app, version, deployment_intent_group)
            .await?
        {
            return Err(IntentError::DependencyMissing(
                "Unable to find the deployment-intent-group-name".to_string(),
            ));
        }
        Ok(())
    }

    /// Deployment chain plus the network-control-intent parent
    pub async fn check_net_control_chain(
        &self,
        project: &str,
        composite_app: &str,
        version: &str,
        deployment_intent_group: &str,
        net_control_intent: &str,
    ) -> Result<(), IntentError> {
        self.check_deployment_chain(project, composite_app, version, deployment_intent_group)
            .await?;
        if !self
            .net_control_intent_exists(
                project,
                composite_app,
                version,
                deployment_intent_group,
                net_control_intent,
            )
            .await?
        {
            return Err(IntentError::DependencyMissing(
                "Parent NetControlIntent resource does not exist".to_string(),
            ));
        }
        Ok(())
    }
}

/// Seed helpers for orchestrator rows
///
/// The orchestrator provisions these rows in production; tests and local
/// bootstrap use the helpers to stand in for it.
pub mod seed {
    use super::*;

    async fn put(
        store: &Arc<dyn Store>,
        key: &impl StoreKey,
        tag: &str,
        name: &str,
    ) -> Result<(), IntentError> {
        let body = serde_json::to_vec(&json!({ "metadata": { "name": name } }))?;
        store
            .insert(ORCHESTRATOR_COLLECTION, &key.key_value()?, None, tag, body)
            .await
            .map_err(|e| IntentError::Db(e.to_string()))
    }

    pub async fn register_project(store: &Arc<dyn Store>, project: &str) -> Result<(), IntentError> {
        put(
            store,
            &ProjectKey {
                project: project.to_string(),
            },
            PROJECT_TAG,
            project,
        )
        .await
    }

    pub async fn register_composite_app(
        store: &Arc<dyn Store>,
        project: &str,
        composite_app: &str,
        version: &str,
    ) -> Result<(), IntentError> {
        put(
            store,
            &CompositeAppKey {
                project: project.to_string(),
                composite_app: composite_app.to_string(),
                composite_app_version: version.to_string(),
            },
            COMPOSITE_APP_TAG,
            composite_app,
        )
        .await
    }

    pub async fn register_deployment_intent_group(
        store: &Arc<dyn Store>,
        project: &str,
        composite_app: &str,
        version: &str,
        deployment_intent_group: &str,
    ) -> Result<(), IntentError> {
        put(
            store,
            &DeploymentIntentGroupKey {
                project: project.to_string(),
                composite_app: composite_app.to_string(),
                composite_app_version: version.to_string(),
                deployment_intent_group: deployment_intent_group.to_string(),
            },
            DIG_TAG,
            deployment_intent_group,
        )
        .await
    }

    pub async fn register_net_control_intent(
        store: &Arc<dyn Store>,
        project: &str,
        composite_app: &str,
        version: &str,
        deployment_intent_group: &str,
        net_control_intent: &str,
    ) -> Result<(), IntentError> {
        put(
            store,
            &NetControlIntentKey {
                project: project.to_string(),
                composite_app: composite_app.to_string(),
                composite_app_version: version.to_string(),
                deployment_intent_group: deployment_intent_group.to_string(),
                net_controller_intent: net_control_intent.to_string(),
            },
            NET_CONTROL_INTENT_TAG,
            net_control_intent,
        )
        .await
    }

    /// Register the whole deployment chain in one call
    pub async fn register_deployment_chain(
        store: &Arc<dyn Store>,
        project: &str,
        composite_app: &str,
        version: &str,
        deployment_intent_group: &str,
    ) -> Result<(), IntentError> {
        register_project(store, project).await?;
        register_composite_app(store, project, composite_app, version).await?;
        register_deployment_intent_group(store, project, composite_app, version, deployment_intent_group)
            .await
    }
}
