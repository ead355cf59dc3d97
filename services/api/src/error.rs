//! Custom error types for the API service

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::response::Envelope;
use thiserror::Error;
use tracing::error;

use crate::services::ServiceError;

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request body that failed to parse or validate
    #[error("{0}")]
    Validation(String),

    /// Path segment that is not a valid id
    #[error("{0}")]
    InvalidPath(String),

    /// Service failure; `action` becomes the envelope message
    #[error("{source}")]
    Service {
        action: String,
        #[source]
        source: ServiceError,
    },
}

impl ApiError {
    pub fn service(action: impl Into<String>, source: ServiceError) -> Self {
        ApiError::Service {
            action: action.into(),
            source,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::InvalidPath(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let detail = self.to_string();
        let (status, message) = match self {
            ApiError::Validation(_) => {
                (StatusCode::BAD_REQUEST, "Failed to retrieve request".to_string())
            }
            ApiError::InvalidPath(_) => {
                (StatusCode::BAD_REQUEST, "Failed to process the request".to_string())
            }
            ApiError::Service { action, .. } => {
                error!("{}: {}", action, detail);
                (StatusCode::INTERNAL_SERVER_ERROR, action)
            }
        };

        Envelope::failure(message, detail).with_status(status)
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
