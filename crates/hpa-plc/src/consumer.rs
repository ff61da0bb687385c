//! Manager for HPA resource consumers

use std::sync::Arc;

use async_trait::async_trait;
use intent_core::key::StoreKey;
use intent_core::{crud, ClientDbInfo, IntentError, ReferenceClient, Store};
use tracing::debug;

use crate::model::{HpaIntent, HpaResourceConsumer, IntentPath};
use crate::{COLLECTION, TAG};

/// CRUD contract for consumers under an intent
#[async_trait]
pub trait HpaConsumerManager: Send + Sync {
    async fn add(
        &self,
        consumer: HpaResourceConsumer,
        path: &IntentPath,
        exists: bool,
    ) -> Result<HpaResourceConsumer, IntentError>;

    async fn get(&self, name: &str, path: &IntentPath)
        -> Result<HpaResourceConsumer, IntentError>;

    async fn get_all(&self, path: &IntentPath) -> Result<Vec<HpaResourceConsumer>, IntentError>;

    async fn delete(&self, name: &str, path: &IntentPath) -> Result<(), IntentError>;

    async fn delete_all(&self, path: &IntentPath) -> Result<(), IntentError>;
}

pub struct HpaConsumerClient {
    db: ClientDbInfo,
    store: Arc<dyn Store>,
    refs: ReferenceClient,
}

impl HpaConsumerClient {
    pub fn new(store: Arc<dyn Store>, refs: ReferenceClient) -> Self {
        Self {
            db: ClientDbInfo::new(COLLECTION, TAG),
            store,
            refs,
        }
    }

    /// Deployment chain plus the owning intent
    async fn check_ancestors(&self, path: &IntentPath) -> Result<(), IntentError> {
        self.refs
            .check_deployment_chain(
                &path.dig.project,
                &path.dig.composite_app,
                &path.dig.version,
                &path.dig.deployment_intent_group,
            )
            .await?;

        let key = path.intent_key().key_value()?;
        let intent: Option<HpaIntent> = crud::find_one(&self.store, &self.db, &key).await?;
        if intent.is_none() {
            return Err(IntentError::DependencyMissing(
                "Unable to find the intent-name".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl HpaConsumerManager for HpaConsumerClient {
    async fn add(
        &self,
        consumer: HpaResourceConsumer,
        path: &IntentPath,
        exists: bool,
    ) -> Result<HpaResourceConsumer, IntentError> {
        self.check_ancestors(path).await?;

        let key = path.consumer_key(&consumer.metadata.name).key_value()?;
        let current: Option<HpaResourceConsumer> =
            crud::find_one(&self.store, &self.db, &key).await?;
        if current.is_some() && !exists {
            return Err(IntentError::AlreadyExists(format!(
                "hpaConsumer {}",
                consumer.metadata.name
            )));
        }

        debug!(consumer = %consumer.metadata.name, update = exists, "Writing hpa consumer");
        crud::put(&self.store, &self.db, &key, &consumer).await?;
        Ok(consumer)
    }

    async fn get(
        &self,
        name: &str,
        path: &IntentPath,
    ) -> Result<HpaResourceConsumer, IntentError> {
        self.check_ancestors(path).await?;

        let key = path.consumer_key(name).key_value()?;
        crud::find_one(&self.store, &self.db, &key)
            .await?
            .ok_or_else(|| IntentError::NotFound(format!("hpaConsumer {name}")))
    }

    async fn get_all(&self, path: &IntentPath) -> Result<Vec<HpaResourceConsumer>, IntentError> {
        self.check_ancestors(path).await?;

        let key = path.consumer_key("").key_value()?;
        crud::find_all(&self.store, &self.db, &key).await
    }

    async fn delete(&self, name: &str, path: &IntentPath) -> Result<(), IntentError> {
        self.get(name, path).await?;

        let key = path.consumer_key(name).key_value()?;
        crud::remove(&self.store, &self.db, &key, &format!("hpaConsumer {name}")).await
    }

    async fn delete_all(&self, path: &IntentPath) -> Result<(), IntentError> {
        for consumer in self.get_all(path).await? {
            self.delete(&consumer.metadata.name, path).await?;
        }
        Ok(())
    }
}
