//! Error types for token handling and authentication endpoints

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::response::Envelope;
use thiserror::Error;

/// Failure modes of the token authority
///
/// These stay internal: at the HTTP boundary every variant except
/// `AlreadyRevoked` collapses into a generic "Invalid token".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is malformed: {0}")]
    Malformed(String),

    #[error("token has expired")]
    Expired,

    #[error("token signature is invalid")]
    BadSignature,

    #[error("token has been invalidated")]
    Revoked,

    #[error("token has already been invalidated")]
    AlreadyRevoked,

    #[error("failed to sign token: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature => TokenError::BadSignature,
            _ => TokenError::Malformed(err.to_string()),
        }
    }
}

/// Custom error type for authentication errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Token Not Found")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("username not registered")]
    UsernameNotRegistered,

    #[error("wrong password")]
    WrongPassword,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    LogoutFailed(#[source] TokenError),

    #[error("Internal server error")]
    Internal,
}

impl AuthError {
    fn status_and_message(&self) -> (StatusCode, &'static str) {
        match self {
            AuthError::MissingToken | AuthError::InvalidToken => {
                (StatusCode::UNAUTHORIZED, "Failed to process the request")
            }
            AuthError::UsernameNotRegistered | AuthError::WrongPassword => {
                (StatusCode::FORBIDDEN, "Invalid credentials")
            }
            AuthError::Validation(_) => (StatusCode::BAD_REQUEST, "Failed to retrieve request"),
            AuthError::LogoutFailed(_) => (StatusCode::BAD_REQUEST, "Failed to logout"),
            AuthError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        }
    }
}

impl From<JsonRejection> for AuthError {
    fn from(rejection: JsonRejection) -> Self {
        AuthError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        Envelope::failure(message, self.to_string()).with_status(status)
    }
}
