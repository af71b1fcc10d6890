// Error handling types for the API

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::fmt;
use tracing::error;

use super::validation::ValidationResult;
use crate::services::{EmailError, SupabaseError};

/// API error taxonomy. Every handler failure is expressed as one of these
/// variants; the status mapping lives in exactly one place below.
#[derive(Debug)]
pub enum ApiError {
    Unauthorized(String),
    Forbidden(String),
    BadRequest(String),
    ValidationError(String),
    NotFound(String),
    MethodNotAllowed(String),
    InternalServer(String),
    ServiceUnavailable(String),
    Upstream(SupabaseError),
    Email(EmailError),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            ApiError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ApiError::MethodNotAllowed(msg) => write!(f, "Method Not Allowed: {}", msg),
            ApiError::InternalServer(msg) => write!(f, "Internal Server Error: {}", msg),
            ApiError::ServiceUnavailable(msg) => write!(f, "Service Unavailable: {}", msg),
            ApiError::Upstream(e) => write!(f, "Upstream Error: {}", e),
            ApiError::Email(e) => write!(f, "Email Error: {}", e),
        }
    }
}

/// JSON error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_message, code) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, "UNAUTHORIZED"),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, "FORBIDDEN"),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, "BAD_REQUEST"),
            ApiError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg, "VALIDATION_ERROR"),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, "NOT_FOUND"),
            ApiError::MethodNotAllowed(msg) => {
                (StatusCode::METHOD_NOT_ALLOWED, msg, "METHOD_NOT_ALLOWED")
            }
            ApiError::InternalServer(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                msg,
                "INTERNAL_SERVER_ERROR",
            ),
            ApiError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                msg,
                "SERVICE_UNAVAILABLE",
            ),
            // Upstream detail is logged here and never reaches the client.
            ApiError::Upstream(e) => {
                error!(error = %e, "Upstream call failed");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Operation unavailable".to_string(),
                    "UPSTREAM_UNAVAILABLE",
                )
            }
            ApiError::Email(e) => {
                error!(error = %e, "Email delivery failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to send email".to_string(),
                    "EMAIL_ERROR",
                )
            }
        };

        let error_response = ErrorResponse {
            error: error_message,
            code: code.to_string(),
        };

        (status, Json(error_response)).into_response()
    }
}

impl From<SupabaseError> for ApiError {
    fn from(e: SupabaseError) -> Self {
        ApiError::Upstream(e)
    }
}

impl From<EmailError> for ApiError {
    fn from(e: EmailError) -> Self {
        ApiError::Email(e)
    }
}

/// Helper to convert a failed ValidationResult into an ApiError
impl From<ValidationResult> for ApiError {
    fn from(result: ValidationResult) -> Self {
        let error_messages: Vec<String> = result
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        ApiError::ValidationError(error_messages.join(", "))
    }
}
