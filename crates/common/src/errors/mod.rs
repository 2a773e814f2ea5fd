//! Error types for TextSum services
//!
//! Provides a comprehensive error handling system with:
//! - Distinct error types for the invalid-input / not-found / storage taxonomy
//! - HTTP status code mapping
//! - Structured error responses
//! - Error codes for client handling

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors (1xxx)
    ValidationError,
    InvalidId,

    // Resource errors (4xxx)
    NotFound,
    SummaryNotFound,

    // Database errors (7xxx)
    DatabaseError,
    ConnectionError,

    // External service errors (8xxx)
    UpstreamError,
    SummarizerError,
    SummarizerTimeout,

    // Internal errors (9xxx)
    ConfigurationError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            ErrorCode::ValidationError => 1001,
            ErrorCode::InvalidId => 1002,

            ErrorCode::NotFound => 4001,
            ErrorCode::SummaryNotFound => 4002,

            ErrorCode::DatabaseError => 7001,
            ErrorCode::ConnectionError => 7002,

            ErrorCode::UpstreamError => 8001,
            ErrorCode::SummarizerError => 8002,
            ErrorCode::SummarizerTimeout => 8003,

            ErrorCode::ConfigurationError => 9001,
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Invalid input
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        field: Option<String>
    },

    #[error("Invalid summary id '{value}': must be a positive integer")]
    InvalidId { value: String },

    // Not found
    #[error("Resource not found: {resource_type} with id {id}")]
    NotFound { resource_type: String, id: String },

    #[error("Summary not found: {id}")]
    SummaryNotFound { id: i64 },

    // Storage errors
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Database connection error: {message}")]
    DatabaseConnection { message: String },

    // External service errors
    #[error("Summarizer error: {message}")]
    Summarizer { message: String },

    #[error("Summarizer timeout after {timeout_ms}ms")]
    SummarizerTimeout { timeout_ms: u64 },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    // Internal errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl AppError {
    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { .. } => ErrorCode::ValidationError,
            AppError::InvalidId { .. } => ErrorCode::InvalidId,
            AppError::NotFound { .. } => ErrorCode::NotFound,
            AppError::SummaryNotFound { .. } => ErrorCode::SummaryNotFound,
            AppError::Database(_) => ErrorCode::DatabaseError,
            AppError::DatabaseConnection { .. } => ErrorCode::ConnectionError,
            AppError::Summarizer { .. } => ErrorCode::SummarizerError,
            AppError::SummarizerTimeout { .. } => ErrorCode::SummarizerTimeout,
            AppError::HttpClient(_) => ErrorCode::UpstreamError,
            AppError::Configuration { .. } => ErrorCode::ConfigurationError,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 422 Unprocessable Entity
            AppError::Validation { .. } |
            AppError::InvalidId { .. } => StatusCode::UNPROCESSABLE_ENTITY,

            // 404 Not Found
            AppError::NotFound { .. } |
            AppError::SummaryNotFound { .. } => StatusCode::NOT_FOUND,

            // 500 Internal Server Error
            AppError::Database(_) |
            AppError::DatabaseConnection { .. } |
            AppError::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,

            // 502 Bad Gateway
            AppError::Summarizer { .. } |
            AppError::SummarizerTimeout { .. } |
            AppError::HttpClient(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Invalid input: rejected before any store access
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, AppError::Validation { .. } | AppError::InvalidId { .. })
    }

    /// Valid-shaped identifier without a live record
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound { .. } | AppError::SummaryNotFound { .. })
    }

    /// Backing store failure
    pub fn is_storage(&self) -> bool {
        matches!(self, AppError::Database(_) | AppError::DatabaseConnection { .. })
    }

    /// Check if this error should be logged at error level
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Check if this error is a client error
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

/// Structured error response for API
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();
        let message = self.to_string();

        // Log based on severity
        if self.is_server_error() {
            tracing::error!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Server error"
            );
        } else if self.is_client_error() {
            tracing::warn!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Client error"
            );
        }

        let field = match self {
            AppError::Validation { field, .. } => field,
            _ => None,
        };

        let body = ErrorResponse {
            error: ErrorDetails {
                code,
                message,
                field,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Malformed bodies, missing fields and wrong field types are all invalid input
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation {
            message: rejection.body_text(),
            field: None,
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Configuration {
            message: err.to_string(),
        }
    }
}
