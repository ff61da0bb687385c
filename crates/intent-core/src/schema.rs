//! JSON-schema validation of request bodies
//!
//! One schema per resource kind, compiled at startup. The decode pipeline
//! applied to every POST/PUT body is: empty check, JSON parse, schema
//! validation, typed deserialization.

use std::path::Path;

use jsonschema::JSONSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::IntentError;

/// A compiled schema for one resource kind
pub struct SchemaValidator {
    compiled: JSONSchema,
}

impl SchemaValidator {
    /// Compile a schema from its raw JSON text
    pub fn compile(raw: &str) -> Result<Self, IntentError> {
        let schema: Value = serde_json::from_str(raw)
            .map_err(|e| IntentError::Internal(format!("invalid schema document: {e}")))?;
        let compiled = JSONSchema::compile(&schema)
            .map_err(|e| IntentError::Internal(format!("schema compilation failed: {e}")))?;
        Ok(Self { compiled })
    }

    /// Compile a schema from a file on disk
    pub fn from_path(path: &Path) -> Result<Self, IntentError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            IntentError::Internal(format!("cannot read schema {}: {e}", path.display()))
        })?;
        Self::compile(&raw)
    }

    /// Load `file` from `dir` when a schema directory is configured,
    /// otherwise fall back to the compiled-in schema text.
    pub fn load(dir: Option<&str>, file: &str, fallback: &str) -> Result<Self, IntentError> {
        match dir {
            Some(dir) => Self::from_path(&Path::new(dir).join(file)),
            None => Self::compile(fallback),
        }
    }

    /// Validate a request body against the schema
    pub fn validate(&self, doc: &Value) -> Result<(), IntentError> {
        if let Err(errors) = self.compiled.validate(doc) {
            let detail = errors
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(IntentError::Validation(format!(
                "request body failed schema validation: {detail}"
            )));
        }
        Ok(())
    }
}

/// Decode and validate a request body
///
/// Empty or EOF-only bodies map to 400, undecodable JSON to 422, schema
/// violations to 400, in that order.
pub fn decode_body<T: DeserializeOwned>(
    bytes: &[u8],
    validator: &SchemaValidator,
) -> Result<T, IntentError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(IntentError::EmptyBody);
    }
    let doc: Value = serde_json::from_slice(bytes).map_err(|e| {
        if e.is_eof() {
            IntentError::EmptyBody
        } else {
            IntentError::MalformedBody(e.to_string())
        }
    })?;
    validator.validate(&doc)?;
    serde_json::from_value(doc).map_err(|e| IntentError::MalformedBody(e.to_string()))
}
