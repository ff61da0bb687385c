//! Deterministic key encoding for path tuples
//!
//! Every owned resource is addressed by a fixed-arity tuple of ancestor
//! names plus its own name. Keys are serialized as flat JSON objects;
//! `serde_json::Map` orders fields by name, so the canonical string form is
//! stable across processes.
//!
//! Query rules:
//! - A key with every field populated addresses exactly one document.
//! - Trailing fields set to the empty string act as wildcards, which is how
//!   "list all children" is expressed.
//! - Two keys only ever match when they have the same field-name shape, so
//!   tuples of different arity sharing a collection never collide.

use serde::Serialize;
use serde_json::Value;

use crate::error::IntentError;

/// A serializable path tuple usable as a document-store key
pub trait StoreKey: Serialize + Send + Sync + std::fmt::Debug {
    /// Encode the tuple as a flat JSON object
    fn key_value(&self) -> Result<Value, IntentError> {
        let value = serde_json::to_value(self)
            .map_err(|e| IntentError::Internal(format!("key encoding failed: {e}")))?;
        match value {
            Value::Object(_) => Ok(value),
            other => Err(IntentError::Internal(format!(
                "key must encode to an object, got {other}"
            ))),
        }
    }
}

impl<T: Serialize + Send + Sync + std::fmt::Debug> StoreKey for T {}

/// Canonical string form of an encoded key, stable across processes
pub fn canonical(key: &Value) -> String {
    key.to_string()
}

/// Whether a stored key satisfies a query key
///
/// The shapes must agree field-for-field; empty query values are wildcards.
pub fn matches(stored: &Value, query: &Value) -> bool {
    let (Value::Object(stored), Value::Object(query)) = (stored, query) else {
        return false;
    };
    if stored.len() != query.len() {
        return false;
    }
    query.iter().all(|(name, wanted)| {
        let Some(actual) = stored.get(name) else {
            return false;
        };
        match wanted.as_str() {
            Some("") => true,
            _ => actual == wanted,
        }
    })
}

/// Whether `stored` addresses a descendant of `parent`
///
/// True when `stored` agrees with every field of `parent` and carries at
/// least one more field, i.e. its path extends the parent's path.
pub fn is_descendant(stored: &Value, parent: &Value) -> bool {
    let (Value::Object(stored), Value::Object(parent)) = (stored, parent) else {
        return false;
    };
    if stored.len() <= parent.len() {
        return false;
    }
    parent
        .iter()
        .all(|(name, wanted)| stored.get(name) == Some(wanted))
}
