//! Manager for SFC client intents

use std::sync::Arc;

use async_trait::async_trait;
use intent_core::key::StoreKey;
use intent_core::{crud, ClientDbInfo, IntentError, ReferenceClient, Store};
use tracing::debug;

use crate::model::{NetControlIntentPath, SfcClientIntent};
use crate::{COLLECTION, TAG};

/// CRUD contract for SFC client intents under a network-control-intent
#[async_trait]
pub trait SfcClientManager: Send + Sync {
    async fn add(
        &self,
        intent: SfcClientIntent,
        path: &NetControlIntentPath,
        exists: bool,
    ) -> Result<SfcClientIntent, IntentError>;

    async fn get(
        &self,
        name: &str,
        path: &NetControlIntentPath,
    ) -> Result<SfcClientIntent, IntentError>;

    async fn get_all(&self, path: &NetControlIntentPath)
        -> Result<Vec<SfcClientIntent>, IntentError>;

    async fn delete(&self, name: &str, path: &NetControlIntentPath) -> Result<(), IntentError>;

    async fn delete_all(&self, path: &NetControlIntentPath) -> Result<(), IntentError>;
}

pub struct SfcClientClient {
    db: ClientDbInfo,
    store: Arc<dyn Store>,
    refs: ReferenceClient,
}

impl SfcClientClient {
    pub fn new(store: Arc<dyn Store>, refs: ReferenceClient) -> Self {
        Self {
            db: ClientDbInfo::new(COLLECTION, TAG),
            store,
            refs,
        }
    }

    async fn check_ancestors(&self, path: &NetControlIntentPath) -> Result<(), IntentError> {
        self.refs
            .check_net_control_chain(
                &path.project,
                &path.composite_app,
                &path.version,
                &path.deployment_intent_group,
                &path.net_control_intent,
            )
            .await
    }
}

#[async_trait]
impl SfcClientManager for SfcClientClient {
    async fn add(
        &self,
        intent: SfcClientIntent,
        path: &NetControlIntentPath,
        exists: bool,
    ) -> Result<SfcClientIntent, IntentError> {
        self.check_ancestors(path).await?;

        let key = path.intent_key(&intent.metadata.name).key_value()?;
        let current: Option<SfcClientIntent> = crud::find_one(&self.store, &self.db, &key).await?;
        if current.is_some() && !exists {
            return Err(IntentError::AlreadyExists(format!(
                "sfcClientIntent {}",
                intent.metadata.name
            )));
        }

        debug!(intent = %intent.metadata.name, update = exists, "Writing sfc client intent");
        crud::put(&self.store, &self.db, &key, &intent).await?;
        Ok(intent)
    }

    async fn get(
        &self,
        name: &str,
        path: &NetControlIntentPath,
    ) -> Result<SfcClientIntent, IntentError> {
        self.check_ancestors(path).await?;

        let key = path.intent_key(name).key_value()?;
        crud::find_one(&self.store, &self.db, &key)
            .await?
            .ok_or_else(|| IntentError::NotFound(format!("sfcClientIntent {name}")))
    }

    async fn get_all(
        &self,
        path: &NetControlIntentPath,
    ) -> Result<Vec<SfcClientIntent>, IntentError> {
        self.check_ancestors(path).await?;

        let key = path.intent_key("").key_value()?;
        crud::find_all(&self.store, &self.db, &key).await
    }

    async fn delete(&self, name: &str, path: &NetControlIntentPath) -> Result<(), IntentError> {
        self.get(name, path).await?;

        let key = path.intent_key(name).key_value()?;
        crud::remove(&self.store, &self.db, &key, &format!("sfcClientIntent {name}")).await
    }

    async fn delete_all(&self, path: &NetControlIntentPath) -> Result<(), IntentError> {
        for intent in self.get_all(path).await? {
            self.delete(&intent.metadata.name, path).await?;
        }
        Ok(())
    }
}
