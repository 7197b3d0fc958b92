//! Rental service error types.
//!
//! All errors map to HTTP status codes via the `IntoResponse` impl.
//! Infrastructure failures are logged server-side and returned to clients
//! with a generic message. Authentication failures withhold detail beyond
//! the error code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Which credential check rejected a login.
///
/// Both render as the same 401 response so callers cannot probe which
/// emails are registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialFailure {
    UnknownEmail,
    WrongPassword,
}

/// Rental service error type.
///
/// Maps to HTTP status codes:
/// - Validation: 422 Unprocessable Entity
/// - MissingToken: 403 Forbidden
/// - InvalidToken, TokenExpired, TokenRevoked, AuthenticationFailed: 401 Unauthorized
/// - NotFound: 404 Not Found
/// - Conflict: 409 Conflict
/// - Cache: 503 Service Unavailable
/// - Database, Crypto, Internal: 500 Internal Server Error
#[derive(Debug, Error)]
pub enum RentalError {
    #[error("Validation failed: {0:?}")]
    Validation(Vec<FieldError>),

    #[error("No token provided")]
    MissingToken,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Token has been revoked")]
    TokenRevoked,

    #[error("Authentication failed: {0:?}")]
    AuthenticationFailed(CredentialFailure),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Cryptographic error: {0}")]
    Crypto(String),

    #[error("Internal server error")]
    Internal,
}

impl RentalError {
    /// Shorthand for a validation error on a single field.
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        RentalError::Validation(vec![FieldError::new(field, message)])
    }

    /// Returns the HTTP status code for this error (for metrics recording).
    pub fn status_code(&self) -> u16 {
        match self {
            RentalError::Validation(_) => 422,
            RentalError::MissingToken => 403,
            RentalError::InvalidToken(_)
            | RentalError::TokenExpired
            | RentalError::TokenRevoked
            | RentalError::AuthenticationFailed(_) => 401,
            RentalError::NotFound(_) => 404,
            RentalError::Conflict(_) => 409,
            RentalError::Cache(_) => 503,
            RentalError::Database(_) | RentalError::Crypto(_) | RentalError::Internal => 500,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<Vec<FieldError>>,
}

impl IntoResponse for RentalError {
    fn into_response(self) -> Response {
        let (status, code, message, fields) = match self {
            RentalError::Validation(fields) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_ERROR",
                "Request validation failed".to_string(),
                Some(fields),
            ),
            RentalError::MissingToken => (
                StatusCode::FORBIDDEN,
                "MISSING_TOKEN",
                "No token provided!".to_string(),
                None,
            ),
            RentalError::InvalidToken(reason) => {
                (StatusCode::UNAUTHORIZED, "INVALID_TOKEN", reason, None)
            }
            RentalError::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                "TOKEN_EXPIRED",
                "The access token has expired".to_string(),
                None,
            ),
            RentalError::TokenRevoked => (
                StatusCode::UNAUTHORIZED,
                "LOGIN_REQUIRED",
                "You have to login!".to_string(),
                None,
            ),
            RentalError::AuthenticationFailed(_) => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "Invalid email or password".to_string(),
                None,
            ),
            RentalError::NotFound(resource) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", resource, None)
            }
            RentalError::Conflict(reason) => (StatusCode::CONFLICT, "CONFLICT", reason, None),
            RentalError::Database(err) => {
                tracing::error!(target: "rental.database", error = %err, "Database operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "An internal database error occurred".to_string(),
                    None,
                )
            }
            RentalError::Cache(err) => {
                tracing::warn!(target: "rental.cache", error = %err, "Revocation cache unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "SERVICE_UNAVAILABLE",
                    "Service temporarily unavailable".to_string(),
                    None,
                )
            }
            RentalError::Crypto(err) => {
                tracing::error!(target: "rental.crypto", error = %err, "Cryptographic operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CRYPTO_ERROR",
                    "An internal cryptographic error occurred".to_string(),
                    None,
                )
            }
            RentalError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
                None,
            ),
        };

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                fields,
            },
        };

        let mut response = (status, Json(error_response)).into_response();

        if status == StatusCode::UNAUTHORIZED {
            if let Ok(header_value) = "Bearer realm=\"rental-api\"".parse() {
                response
                    .headers_mut()
                    .insert("WWW-Authenticate", header_value);
            }
        }

        response
    }
}

impl From<sqlx::Error> for RentalError {
    fn from(err: sqlx::Error) -> Self {
        RentalError::Database(err.to_string())
    }
}
