//! Uniform JSON response envelope
//!
//! Every endpoint, successful or not, answers with the same shape:
//! `{"status": bool, "message": string, "data": any, "error": string|null}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Serializes as `{}`; used as the `data` payload of failures
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct EmptyObject {}

/// Response envelope shared by every endpoint
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T: Serialize> {
    pub status: bool,
    pub message: String,
    pub data: T,
    pub error: Option<String>,
}

impl<T: Serialize> Envelope<T> {
    /// Build a successful envelope
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            status: true,
            message: message.into(),
            data,
            error: None,
        }
    }

    /// Pair the envelope with an HTTP status code
    pub fn with_status(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

impl Envelope<EmptyObject> {
    /// Build a failed envelope carrying an error detail
    pub fn failure(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            status: false,
            message: message.into(),
            data: EmptyObject {},
            error: Some(error.into()),
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        self.with_status(StatusCode::OK)
    }
}
