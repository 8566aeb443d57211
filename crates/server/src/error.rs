//! Service error taxonomy and its HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use predictor_facade::ModelError;
use reading_facade::{ConfigError, StoreError};
use thiserror::Error;

/// Errors surfaced by the ingestion and forecast operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The store was unreachable or refused the operation
    #[error("Storage error: {0}")]
    Storage(StoreError),

    /// No reading exists yet
    #[error("{0}")]
    NotFound(String),

    /// Inference failed or the artifact is unusable
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// The request carried values the service cannot accept
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidInput(reason) => ServiceError::InvalidInput(reason),
            other => ServiceError::Storage(other),
        }
    }
}

impl ServiceError {
    pub fn no_readings() -> Self {
        ServiceError::NotFound("No temperature data found in the database.".to_string())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Storage(_) | ServiceError::Model(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }

        let body = Json(serde_json::json!({
            "status": "error",
            "detail": self.to_string(),
        }));
        (status, body).into_response()
    }
}

/// Reasons the service refuses to start.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ServiceError::Storage(StoreError::Connection("down".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ServiceError::no_readings().status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::Model(ModelError::Inference("nan".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ServiceError::InvalidInput("page".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_store_invalid_input_becomes_bad_request() {
        let err = ServiceError::from(StoreError::InvalidInput("page must be at least 1".into()));
        assert!(matches!(err, ServiceError::InvalidInput(_)));

        let err = ServiceError::from(StoreError::Query("syntax".into()));
        assert!(matches!(err, ServiceError::Storage(_)));
    }

    #[test]
    fn test_messages_carry_detail() {
        let err = ServiceError::Storage(StoreError::Rejected("Duplicate entry".into()));
        assert_eq!(err.to_string(), "Storage error: Write rejected: Duplicate entry");
        assert_eq!(
            ServiceError::no_readings().to_string(),
            "No temperature data found in the database."
        );
    }

    #[test]
    fn test_startup_error_from_model() {
        let err = StartupError::from(ModelError::ArtifactMissing("model/dnn.json".into()));
        assert!(matches!(err, StartupError::Model(ModelError::ArtifactMissing(_))));
    }
}
