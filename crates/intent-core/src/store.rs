//! Document-store adapter
//!
//! The controllers are stateless; the document store is the only shared
//! mutable resource. `Store` is the narrow interface the managers need, and
//! `MemStore` is the in-process reference implementation used by the
//! binaries and the tests. A production deployment injects its own backend.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::key;

/// Failure markers surfaced by a store backend
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No document exists under the key
    #[error("document not found")]
    NotFound,

    /// Remove refused because documents exist under descendant keys
    #[error("document has child references")]
    HasChildren,

    /// Backend-specific failure
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Collection and tag names a manager writes under
#[derive(Debug, Clone)]
pub struct ClientDbInfo {
    pub collection: String,
    pub tag: String,
}

impl ClientDbInfo {
    pub fn new(collection: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            tag: tag.into(),
        }
    }
}

/// Narrow interface over the external document store
///
/// Uniqueness of paths is enforced by the managers; `insert` is an upsert of
/// the `(key, tag)` pair and must not reject duplicates on its own.
#[async_trait]
pub trait Store: Send + Sync {
    /// Upsert `(key, tag) -> value`. `query` narrows the target document for
    /// backends that support sub-document updates; it may be ignored.
    async fn insert(
        &self,
        collection: &str,
        key: &Value,
        query: Option<&Value>,
        tag: &str,
        value: Vec<u8>,
    ) -> Result<(), StoreError>;

    /// Find tagged values under a total or prefix key.
    ///
    /// A total key yields at most one element; a prefix key yields zero or
    /// more. Backends may report "nothing there" either as an empty list or
    /// as `NotFound` - callers must accept both shapes.
    async fn find(&self, collection: &str, key: &Value, tag: &str)
        -> Result<Vec<Vec<u8>>, StoreError>;

    /// Remove the document under a total key.
    ///
    /// Fails with `NotFound` when the key is absent and with `HasChildren`
    /// when documents exist under descendant keys.
    async fn remove(&self, collection: &str, key: &Value) -> Result<(), StoreError>;
}

/// Deserialize a stored value
pub fn unmarshal<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
    serde_json::from_slice(bytes).map_err(|e| StoreError::Backend(format!("unmarshal failed: {e}")))
}

/// One stored document: its decoded key plus tagged payloads
#[derive(Debug, Clone)]
struct Document {
    key: Value,
    tags: HashMap<String, Vec<u8>>,
}

/// In-memory document store
///
/// Collections map canonical key strings to documents; the `BTreeMap` keeps
/// scans ordered so listings are deterministic. Shareable via `Arc`.
#[derive(Default)]
pub struct MemStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Document>>>,
}

impl MemStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl Store for MemStore {
    async fn insert(
        &self,
        collection: &str,
        key: &Value,
        _query: Option<&Value>,
        tag: &str,
        value: Vec<u8>,
    ) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        let doc = docs.entry(key::canonical(key)).or_insert_with(|| Document {
            key: key.clone(),
            tags: HashMap::new(),
        });
        doc.tags.insert(tag.to_string(), value);
        Ok(())
    }

    async fn find(
        &self,
        collection: &str,
        key: &Value,
        tag: &str,
    ) -> Result<Vec<Vec<u8>>, StoreError> {
        let collections = self.collections.read().await;
        // An unknown collection reports NotFound; an empty match within a
        // known collection reports an empty list. Callers handle both.
        let docs = collections.get(collection).ok_or(StoreError::NotFound)?;
        let mut out = Vec::new();
        for doc in docs.values() {
            if key::matches(&doc.key, key) {
                if let Some(bytes) = doc.tags.get(tag) {
                    out.push(bytes.clone());
                }
            }
        }
        Ok(out)
    }

    async fn remove(&self, collection: &str, key: &Value) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let docs = collections
            .get_mut(collection)
            .ok_or(StoreError::NotFound)?;
        let canonical = key::canonical(key);
        if !docs.contains_key(&canonical) {
            return Err(StoreError::NotFound);
        }
        if docs.values().any(|doc| key::is_descendant(&doc.key, key)) {
            return Err(StoreError::HasChildren);
        }
        docs.remove(&canonical);
        Ok(())
    }
}
