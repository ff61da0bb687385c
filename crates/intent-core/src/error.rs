//! Error taxonomy for the intent controllers
//!
//! Managers return `IntentError` values; the HTTP layer maps each variant to
//! a status code via `IntoResponse`. Display output keeps the conventional
//! substrings ("not found", "already exists", "conflict") that downstream
//! callers match on.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::store::StoreError;

/// Result type for manager operations
pub type Result<T> = std::result::Result<T, IntentError>;

/// Domain error for intent CRUD operations
#[derive(Debug, thiserror::Error)]
pub enum IntentError {
    /// An ancestor of the addressed resource does not exist. The message
    /// identifies the missing level ("Unable to find the project", ...).
    #[error("{0}")]
    DependencyMissing(String),

    /// The addressed resource itself does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// Create collided with an existing resource at the same path
    #[error("{0} already exists")]
    AlreadyExists(String),

    /// Delete refused because child resources still reference the target
    #[error("conflict: {0}")]
    Conflict(String),

    /// Request failed validation (schema, cross-field or name checks)
    #[error("{0}")]
    Validation(String),

    /// Request carried no body
    #[error("empty request body")]
    EmptyBody,

    /// Request body is not decodable JSON
    #[error("malformed request body: {0}")]
    MalformedBody(String),

    /// Document store failure with no more specific classification
    #[error("db error: {0}")]
    Db(String),

    /// Encoder or other in-process failure on the response path
    #[error("{0}")]
    Internal(String),
}

impl IntentError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            IntentError::DependencyMissing(_) | IntentError::NotFound(_) => StatusCode::NOT_FOUND,
            IntentError::AlreadyExists(_) | IntentError::Conflict(_) => StatusCode::CONFLICT,
            IntentError::Validation(_) | IntentError::EmptyBody => StatusCode::BAD_REQUEST,
            IntentError::MalformedBody(_) => StatusCode::UNPROCESSABLE_ENTITY,
            IntentError::Db(_) | IntentError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Bucket a store failure for an operation on `what`
    ///
    /// `NotFound` becomes target-missing, `HasChildren` becomes a delete
    /// conflict, anything else is a generic store error.
    pub fn from_store(err: StoreError, what: &str) -> Self {
        match err {
            StoreError::NotFound => IntentError::NotFound(what.to_string()),
            StoreError::HasChildren => {
                IntentError::Conflict(format!("{what} has child resources, delete them first"))
            }
            StoreError::Backend(msg) => IntentError::Db(msg),
        }
    }
}

impl From<serde_json::Error> for IntentError {
    fn from(e: serde_json::Error) -> Self {
        IntentError::Internal(e.to_string())
    }
}

impl IntoResponse for IntentError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = serde_json::json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_matches_taxonomy() {
        assert_eq!(
            IntentError::DependencyMissing("Unable to find the project".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            IntentError::NotFound("hpaIntent i1".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            IntentError::AlreadyExists("hpaIntent i1".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            IntentError::Conflict("hpaIntent i1".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            IntentError::Validation("bad name".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(IntentError::EmptyBody.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            IntentError::MalformedBody("eof".into()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            IntentError::Db("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn display_keeps_legacy_substrings() {
        assert!(IntentError::NotFound("hpaIntent i1".into())
            .to_string()
            .contains("not found"));
        assert!(IntentError::AlreadyExists("hpaIntent i1".into())
            .to_string()
            .contains("already exists"));
        assert!(IntentError::Conflict("hpaIntent i1".into())
            .to_string()
            .contains("conflict"));
    }

    #[test]
    fn store_errors_bucket_into_three_kinds() {
        assert!(matches!(
            IntentError::from_store(StoreError::NotFound, "hpaIntent i1"),
            IntentError::NotFound(_)
        ));
        assert!(matches!(
            IntentError::from_store(StoreError::HasChildren, "hpaIntent i1"),
            IntentError::Conflict(_)
        ));
        assert!(matches!(
            IntentError::from_store(StoreError::Backend("io".into()), "hpaIntent i1"),
            IntentError::Db(_)
        ));
    }
}
