//! Error handling module for the resume backend.
//!
//! Provides centralized error types with mapping to HTTP status codes and response bodies.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::validation::FieldViolation;

/// Message for request bodies that are not valid JSON for the target type.
pub const INVALID_BODY: &str = "Invalid request body";

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const METHOD_NOT_ALLOWED: &str = "METHOD_NOT_ALLOWED";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
    pub const DATABASE_ERROR: &str = "DATABASE_ERROR";
    pub const UPSTREAM_ERROR: &str = "UPSTREAM_ERROR";
    pub const INVALID_UPSTREAM_RESPONSE: &str = "INVALID_UPSTREAM_RESPONSE";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// Field-level request validation failures
    Validation(Vec<FieldViolation>),
    /// Malformed request (body, path id, query parameters)
    BadRequest(String),
    /// Missing or wrong bearer token
    Unauthorized(String),
    /// Resource not found
    NotFound(String),
    /// Method not supported for the selected resource
    MethodNotAllowed(String),
    /// Storage failure
    Database(String),
    /// Upstream chat-completion gateway unreachable or misconfigured
    Upstream(String),
    /// Upstream answered successfully but without the expected shape
    InvalidUpstreamResponse(String),
    /// Internal server error
    Internal(String),
}

impl AppError {
    /// Build a not-found error for the named resource.
    pub fn not_found(resource: &str) -> Self {
        AppError::NotFound(format!("{} not found", resource))
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InvalidUpstreamResponse(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => codes::VALIDATION_ERROR,
            AppError::BadRequest(_) => codes::BAD_REQUEST,
            AppError::Unauthorized(_) => codes::UNAUTHORIZED,
            AppError::NotFound(_) => codes::NOT_FOUND,
            AppError::MethodNotAllowed(_) => codes::METHOD_NOT_ALLOWED,
            AppError::Database(_) => codes::DATABASE_ERROR,
            AppError::Upstream(_) => codes::UPSTREAM_ERROR,
            AppError::InvalidUpstreamResponse(_) => codes::INVALID_UPSTREAM_RESPONSE,
            AppError::Internal(_) => codes::INTERNAL_ERROR,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            AppError::Validation(_) => "Validation failed".to_string(),
            AppError::BadRequest(msg) => msg.clone(),
            AppError::Unauthorized(msg) => msg.clone(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::MethodNotAllowed(msg) => msg.clone(),
            AppError::Database(msg) => msg.clone(),
            AppError::Upstream(msg) => msg.clone(),
            AppError::InvalidUpstreamResponse(msg) => msg.clone(),
            AppError::Internal(msg) => msg.clone(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {:?}", err);
        AppError::Database(format!("Database error: {}", err))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        tracing::warn!("Upstream request error: {:?}", err);
        AppError::Upstream(format!("Failed to reach chat upstream: {}", err))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("Rejected request body: {}", rejection.body_text());
        AppError::BadRequest(INVALID_BODY.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON error: {:?}", err);
        AppError::Internal(format!("JSON error: {}", err))
    }
}

/// Plain error body: `{"error": "..."}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Validation error body: `{"error": "Validation failed", "errors": [...]}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ValidationErrorResponse {
    pub error: String,
    pub errors: Vec<FieldViolation>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            AppError::Validation(errors) => {
                let body = ValidationErrorResponse {
                    error: "Validation failed".to_string(),
                    errors,
                };
                (status, Json(body)).into_response()
            }
            other => {
                let body = ErrorResponse {
                    error: other.message(),
                };
                (status, Json(body)).into_response()
            }
        }
    }
}
