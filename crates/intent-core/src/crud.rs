//! Store-level CRUD steps shared by every resource manager
//!
//! The per-type managers differ only in tuple arity and ancestor chain;
//! the actual store interaction is identical and lives here.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::IntentError;
use crate::store::{unmarshal, ClientDbInfo, Store, StoreError};

/// Read the document under a total key, if any
///
/// More than one document under a path violates the uniqueness invariant
/// and is reported as a store error.
pub async fn find_one<T: DeserializeOwned>(
    store: &Arc<dyn Store>,
    db: &ClientDbInfo,
    key: &Value,
) -> Result<Option<T>, IntentError> {
    match store.find(&db.collection, key, &db.tag).await {
        Err(StoreError::NotFound) => Ok(None),
        Err(e) => Err(IntentError::Db(e.to_string())),
        Ok(docs) if docs.is_empty() => Ok(None),
        Ok(docs) if docs.len() == 1 => {
            let value = unmarshal(&docs[0]).map_err(|e| IntentError::Db(e.to_string()))?;
            Ok(Some(value))
        }
        Ok(_) => Err(IntentError::Db(
            "multiple documents under a single path".to_string(),
        )),
    }
}

/// List every document matching a prefix key
pub async fn find_all<T: DeserializeOwned>(
    store: &Arc<dyn Store>,
    db: &ClientDbInfo,
    key: &Value,
) -> Result<Vec<T>, IntentError> {
    let docs = match store.find(&db.collection, key, &db.tag).await {
        Err(StoreError::NotFound) => Vec::new(),
        Err(e) => return Err(IntentError::Db(e.to_string())),
        Ok(docs) => docs,
    };
    docs.iter()
        .map(|bytes| unmarshal(bytes).map_err(|e| IntentError::Db(e.to_string())))
        .collect()
}

/// Upsert a value under a total key
pub async fn put<T: Serialize>(
    store: &Arc<dyn Store>,
    db: &ClientDbInfo,
    key: &Value,
    value: &T,
) -> Result<(), IntentError> {
    let bytes = serde_json::to_vec(value)?;
    store
        .insert(&db.collection, key, None, &db.tag, bytes)
        .await
        .map_err(|e| IntentError::Db(e.to_string()))
}

/// Remove the document under a total key
///
/// `what` names the resource in not-found and conflict messages.
pub async fn remove(
    store: &Arc<dyn Store>,
    db: &ClientDbInfo,
    key: &Value,
    what: &str,
) -> Result<(), IntentError> {
    store
        .remove(&db.collection, key)
        .await
        .map_err(|e| IntentError::from_store(e, what))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemStore;
    use serde_json::json;

    fn setup() -> (Arc<dyn Store>, ClientDbInfo) {
        let store: Arc<dyn Store> = MemStore::new();
        (store, ClientDbInfo::new("c", "t"))
    }

    #[tokio::test]
    async fn find_one_distinguishes_absent_from_present() {
        let (store, db) = setup();
        let key = json!({"project": "p", "hpaIntent": "i1"});

        let absent: Option<Value> = find_one(&store, &db, &key).await.unwrap();
        assert!(absent.is_none());

        put(&store, &db, &key, &json!({"v": 1})).await.unwrap();
        let present: Option<Value> = find_one(&store, &db, &key).await.unwrap();
        assert_eq!(present.unwrap()["v"], 1);
    }

    #[tokio::test]
    async fn find_all_returns_empty_for_unknown_collections() {
        let (store, db) = setup();
        let listed: Vec<Value> = find_all(&store, &db, &json!({"project": ""})).await.unwrap();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn remove_maps_store_markers_to_domain_errors() {
        let (store, db) = setup();
        let key = json!({"project": "p", "hpaIntent": "i1"});
        put(&store, &db, &key, &json!({"v": 1})).await.unwrap();

        let missing = json!({"project": "p", "hpaIntent": "i2"});
        let err = remove(&store, &db, &missing, "hpaIntent i2").await.unwrap_err();
        assert!(matches!(err, IntentError::NotFound(_)));

        remove(&store, &db, &key, "hpaIntent i1").await.unwrap();
    }
}
