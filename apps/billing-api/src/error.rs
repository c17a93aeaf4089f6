//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Handler ── Result<Json<T>, ApiError>                                   │
//! │     │                                                                   │
//! │     ├── LedgerError::Validation ──► 400 VALIDATION_ERROR + details      │
//! │     ├── LedgerError::NotFound   ──► 404 NOT_FOUND                       │
//! │     ├── LedgerError::Conflict   ──► 409 CONFLICT                        │
//! │     ├── LedgerError::Store      ──► 500 INTERNAL (logged)               │
//! │     └── DispatchError           ──► 400 / 404 / 503 / 500               │
//! │                                                                         │
//! │  Compensation failures never get here: they ride along in a             │
//! │  successful response.                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Body
//! ```json
//! {
//!   "code": "VALIDATION_ERROR",
//!   "message": "Validation failed",
//!   "details": ["partyName is required", "items[0].quantity must be positive"]
//! }
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use billing_dispatch::DispatchError;
use billing_ledger::LedgerError;

/// Error body returned by every failing handler.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    /// One entry per failed field, for validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed (400)
    ValidationError,

    /// Resource not found (404)
    NotFound,

    /// Unique key already taken (409)
    Conflict,

    /// Internal server error (500)
    Internal,

    /// A dependency is down or too slow (503)
    Unavailable,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Unavailable, message)
    }

    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = Some(details);
        self
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// =============================================================================
// Conversions
// =============================================================================

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Validation(errors) => {
                ApiError::validation("Validation failed").with_details(errors.messages())
            }
            LedgerError::NotFound { entity, id } => ApiError::not_found(entity, &id),
            LedgerError::Conflict { field, value } => ApiError::new(
                ErrorCode::Conflict,
                format!("{} already exists: {}", field, value),
            ),
            LedgerError::Store(e) => ApiError::internal(format!("Storage error: {}", e)),
        }
    }
}

impl From<DispatchError> for ApiError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::Invalid { .. } => ApiError::validation(err.to_string()),
            DispatchError::Io(ref io) if io.kind() == std::io::ErrorKind::NotFound => {
                ApiError::new(ErrorCode::NotFound, err.to_string())
            }
            DispatchError::Io(_) => ApiError::internal(err.to_string()),
            DispatchError::Http(_) | DispatchError::Timeout { .. } => {
                ApiError::unavailable(err.to_string())
            }
            DispatchError::NotConfigured(_) => ApiError::unavailable(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.code.status();
        if status.is_server_error() {
            error!(code = ?self.code, message = %self.message, "Request failed");
        }
        (status, Json(self)).into_response()
    }
}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;
