use modkit_security::PermissionError;
use thiserror::Error;

/// Failures of the storage layer. The guard passes these through untouched.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record {0} not found")]
    NotFound(uuid::Uuid),

    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Failures while declaring or looking up record types.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("invalid record type '{record_type}': {source}")]
    InvalidRecordType {
        record_type: String,
        #[source]
        source: PermissionError,
    },

    #[error("record type '{0}' is already registered")]
    Duplicate(String),

    #[error("record type '{0}' is not registered")]
    NotRegistered(String),

    #[error("record type '{record_type}' declares reserved field '{field}'")]
    ReservedField { record_type: String, field: String },

    #[error("record type '{record_type}' declares field '{field}' twice")]
    DuplicateField { record_type: String, field: String },
}

/// Errors surfaced at the HTTP edge of the admin interface.
///
/// Records hidden from the subject never produce an error; they redirect.
#[derive(Debug, Error)]
pub enum OwnershipError {
    #[error("Authentication required: missing or invalid token")]
    Unauthenticated,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RegistryError> for OwnershipError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::NotRegistered(name) => OwnershipError::NotFound(name),
            other => OwnershipError::Internal(other.to_string()),
        }
    }
}

#[cfg(feature = "axum-ext")]
impl axum::response::IntoResponse for OwnershipError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;
        use axum::response::Json;
        use serde_json::json;

        let status = match &self {
            OwnershipError::Unauthenticated => StatusCode::UNAUTHORIZED,
            OwnershipError::NotFound(_) => StatusCode::NOT_FOUND,
            OwnershipError::BadRequest(_) => StatusCode::BAD_REQUEST,
            OwnershipError::Store(e) => {
                tracing::error!(error = %e, "storage error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            OwnershipError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn unknown_record_type_maps_to_not_found() {
        let err: OwnershipError = RegistryError::NotRegistered("blog.post".to_owned()).into();
        assert!(matches!(err, OwnershipError::NotFound(ref name) if name == "blog.post"));
    }

    #[test]
    fn other_registry_errors_are_internal() {
        let err: OwnershipError = RegistryError::Duplicate("blog.post".to_owned()).into();
        assert!(matches!(err, OwnershipError::Internal(_)));
    }

    #[test]
    fn store_errors_keep_their_message() {
        let err: OwnershipError = StoreError::Unavailable("disk full".to_owned()).into();
        assert_eq!(err.to_string(), "storage unavailable: disk full");
    }
}
