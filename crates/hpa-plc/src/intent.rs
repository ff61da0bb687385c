//! Manager for HPA placement intents

use std::sync::Arc;

use async_trait::async_trait;
use intent_core::key::StoreKey;
use intent_core::{crud, ClientDbInfo, IntentError, ReferenceClient, Store};
use tracing::debug;

use crate::model::{DigPath, HpaIntent};
use crate::{COLLECTION, TAG};

/// CRUD contract for intents under a deployment intent group
#[async_trait]
pub trait HpaIntentManager: Send + Sync {
    /// Create (`exists = false`) or update (`exists = true`) an intent
    async fn add(
        &self,
        intent: HpaIntent,
        path: &DigPath,
        exists: bool,
    ) -> Result<HpaIntent, IntentError>;

    async fn get(&self, name: &str, path: &DigPath) -> Result<HpaIntent, IntentError>;

    async fn get_all(&self, path: &DigPath) -> Result<Vec<HpaIntent>, IntentError>;

    async fn delete(&self, name: &str, path: &DigPath) -> Result<(), IntentError>;

    /// Delete every intent under the group; aborts on the first failure
    async fn delete_all(&self, path: &DigPath) -> Result<(), IntentError>;
}

pub struct HpaIntentClient {
    db: ClientDbInfo,
    store: Arc<dyn Store>,
    refs: ReferenceClient,
}

impl HpaIntentClient {
    pub fn new(store: Arc<dyn Store>, refs: ReferenceClient) -> Self {
        Self {
            db: ClientDbInfo::new(COLLECTION, TAG),
            store,
            refs,
        }
    }

    async fn check_ancestors(&self, path: &DigPath) -> Result<(), IntentError> {
        self.refs
            .check_deployment_chain(
                &path.project,
                &path.composite_app,
                &path.version,
                &path.deployment_intent_group,
            )
            .await
    }
}

#[async_trait]
impl HpaIntentManager for HpaIntentClient {
    async fn add(
        &self,
        intent: HpaIntent,
        path: &DigPath,
        exists: bool,
    ) -> Result<HpaIntent, IntentError> {
        self.check_ancestors(path).await?;

        let key = path.intent_key(&intent.metadata.name).key_value()?;
        let current: Option<HpaIntent> = crud::find_one(&self.store, &self.db, &key).await?;
        if current.is_some() && !exists {
            return Err(IntentError::AlreadyExists(format!(
                "hpaIntent {}",
                intent.metadata.name
            )));
        }

        debug!(intent = %intent.metadata.name, update = exists, "Writing hpa intent");
        crud::put(&self.store, &self.db, &key, &intent).await?;
        Ok(intent)
    }

    async fn get(&self, name: &str, path: &DigPath) -> Result<HpaIntent, IntentError> {
        self.check_ancestors(path).await?;

        let key = path.intent_key(name).key_value()?;
        crud::find_one(&self.store, &self.db, &key)
            .await?
            .ok_or_else(|| IntentError::NotFound(format!("hpaIntent {name}")))
    }

    async fn get_all(&self, path: &DigPath) -> Result<Vec<HpaIntent>, IntentError> {
        self.check_ancestors(path).await?;

        let key = path.intent_key("").key_value()?;
        crud::find_all(&self.store, &self.db, &key).await
    }

    async fn delete(&self, name: &str, path: &DigPath) -> Result<(), IntentError> {
        // Confirm existence first so a missing target reports 404 rather
        // than a bare store error.
        self.get(name, path).await?;

        let key = path.intent_key(name).key_value()?;
        crud::remove(&self.store, &self.db, &key, &format!("hpaIntent {name}")).await
    }

    async fn delete_all(&self, path: &DigPath) -> Result<(), IntentError> {
        for intent in self.get_all(path).await? {
            self.delete(&intent.metadata.name, path).await?;
        }
        Ok(())
    }
}
