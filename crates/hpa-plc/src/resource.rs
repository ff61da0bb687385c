//! Manager for HPA resource requirements
//!
//! Requirements carry cross-field constraints that the schema cannot see:
//! the `allocatable` flag must agree with the populated resource body, the
//! parent consumer must name a deployment, allocatable requirements need a
//! container name on the consumer, and `requests` may not exceed `limits`
//! unless limits is 0 (unbounded).

use std::sync::Arc;

use async_trait::async_trait;
use intent_core::key::StoreKey;
use intent_core::{crud, ClientDbInfo, IntentError, ReferenceClient, Store};
use tracing::debug;

use crate::model::{
    ConsumerPath, HpaIntent, HpaResourceConsumer, HpaResourceRequirement, ResourceBody,
};
use crate::{COLLECTION, TAG};

/// CRUD contract for resource requirements under a consumer
#[async_trait]
pub trait HpaResourceManager: Send + Sync {
    async fn add(
        &self,
        resource: HpaResourceRequirement,
        path: &ConsumerPath,
        exists: bool,
    ) -> Result<HpaResourceRequirement, IntentError>;

    async fn get(
        &self,
        name: &str,
        path: &ConsumerPath,
    ) -> Result<HpaResourceRequirement, IntentError>;

    async fn get_all(&self, path: &ConsumerPath)
        -> Result<Vec<HpaResourceRequirement>, IntentError>;

    async fn delete(&self, name: &str, path: &ConsumerPath) -> Result<(), IntentError>;

    async fn delete_all(&self, path: &ConsumerPath) -> Result<(), IntentError>;
}

pub struct HpaResourceClient {
    db: ClientDbInfo,
    store: Arc<dyn Store>,
    refs: ReferenceClient,
}

impl HpaResourceClient {
    pub fn new(store: Arc<dyn Store>, refs: ReferenceClient) -> Self {
        Self {
            db: ClientDbInfo::new(COLLECTION, TAG),
            store,
            refs,
        }
    }

    /// Deployment chain, owning intent and owning consumer. Returns the
    /// consumer so `add` can run the dependent checks without re-reading.
    async fn check_ancestors(
        &self,
        path: &ConsumerPath,
    ) -> Result<HpaResourceConsumer, IntentError> {
        self.refs
            .check_deployment_chain(
                &path.intent.dig.project,
                &path.intent.dig.composite_app,
                &path.intent.dig.version,
                &path.intent.dig.deployment_intent_group,
            )
            .await?;

        let intent_key = path.intent.intent_key().key_value()?;
        let intent: Option<HpaIntent> = crud::find_one(&self.store, &self.db, &intent_key).await?;
        if intent.is_none() {
            return Err(IntentError::DependencyMissing(
                "Unable to find the intent-name".to_string(),
            ));
        }

        let consumer_key = path.consumer_key().key_value()?;
        let consumer: Option<HpaResourceConsumer> =
            crud::find_one(&self.store, &self.db, &consumer_key).await?;
        consumer.ok_or_else(|| {
            IntentError::DependencyMissing("Unable to find the consumer-name".to_string())
        })
    }
}

/// Reject requirements inconsistent with themselves or their consumer.
///
/// Runs after schema validation and before the write. Input is preserved as
/// given; no limits normalisation happens here or anywhere else.
fn validate_dependents(
    resource: &HpaResourceRequirement,
    consumer: &HpaResourceConsumer,
) -> Result<(), IntentError> {
    if consumer.spec.name.is_empty() {
        return Err(IntentError::Validation(format!(
            "consumer {} does not name a deployment",
            consumer.metadata.name
        )));
    }

    match (&resource.spec.resource, resource.spec.allocatable) {
        (ResourceBody::Allocatable(alloc), true) => {
            if consumer.spec.container_name.is_empty() {
                return Err(IntentError::Validation(format!(
                    "allocatable resource {} requires a container name on consumer {}",
                    resource.metadata.name, consumer.metadata.name
                )));
            }
            if alloc.limits > 0 && alloc.requests > alloc.limits {
                return Err(IntentError::Validation(format!(
                    "requests {} exceeds limits {} for resource {}",
                    alloc.requests, alloc.limits, resource.metadata.name
                )));
            }
            Ok(())
        }
        (ResourceBody::NonAllocatable(_), false) => Ok(()),
        (_, allocatable) => Err(IntentError::Validation(format!(
            "allocatable flag {} does not match the resource body of {}",
            allocatable, resource.metadata.name
        ))),
    }
}

#[async_trait]
impl HpaResourceManager for HpaResourceClient {
    async fn add(
        &self,
        resource: HpaResourceRequirement,
        path: &ConsumerPath,
        exists: bool,
    ) -> Result<HpaResourceRequirement, IntentError> {
        let consumer = self.check_ancestors(path).await?;
        validate_dependents(&resource, &consumer)?;

        let key = path.resource_key(&resource.metadata.name).key_value()?;
        let current: Option<HpaResourceRequirement> =
            crud::find_one(&self.store, &self.db, &key).await?;
        if current.is_some() && !exists {
            return Err(IntentError::AlreadyExists(format!(
                "hpaResource {}",
                resource.metadata.name
            )));
        }

        debug!(resource = %resource.metadata.name, update = exists, "Writing hpa resource");
        crud::put(&self.store, &self.db, &key, &resource).await?;
        Ok(resource)
    }

    async fn get(
        &self,
        name: &str,
        path: &ConsumerPath,
    ) -> Result<HpaResourceRequirement, IntentError> {
        self.check_ancestors(path).await?;

        let key = path.resource_key(name).key_value()?;
        crud::find_one(&self.store, &self.db, &key)
            .await?
            .ok_or_else(|| IntentError::NotFound(format!("hpaResource {name}")))
    }

    async fn get_all(
        &self,
        path: &ConsumerPath,
    ) -> Result<Vec<HpaResourceRequirement>, IntentError> {
        self.check_ancestors(path).await?;

        let key = path.resource_key("").key_value()?;
        crud::find_all(&self.store, &self.db, &key).await
    }

    async fn delete(&self, name: &str, path: &ConsumerPath) -> Result<(), IntentError> {
        self.get(name, path).await?;

        let key = path.resource_key(name).key_value()?;
        crud::remove(&self.store, &self.db, &key, &format!("hpaResource {name}")).await
    }

    async fn delete_all(&self, path: &ConsumerPath) -> Result<(), IntentError> {
        for resource in self.get_all(path).await? {
            self.delete(&resource.metadata.name, path).await?;
        }
        Ok(())
    }
}
