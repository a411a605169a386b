//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Shopkeep                               │
//! │                                                                         │
//! │  Handler: Result<T, ApiError>                                          │
//! │         │                                                               │
//! │         ├── JsonRejection         ──► 400 VALIDATION_ERROR             │
//! │         ├── CoreError                                                  │
//! │         │     ├── Validation      ──► 400 VALIDATION_ERROR             │
//! │         │     ├── Unsupported db  ──► 400 UNSUPPORTED_DATABASE         │
//! │         │     ├── SetupIncomplete ──► 400 SETUP_INCOMPLETE             │
//! │         │     └── AdmissionDenied ──► 503 APP_NOT_READY                │
//! │         └── DbError                                                    │
//! │               ├── NotInitialized  ──► 503 DATABASE_UNAVAILABLE         │
//! │               ├── connect/migrate ──► 502 DATABASE_CONNECTION_FAILED   │
//! │               ├── UniqueViolation ──► 409 CONFLICT                     │
//! │               ├── NotFound        ──► 404 NOT_FOUND                    │
//! │               └── anything else   ──► 500 INTERNAL (details logged)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use shopkeep_core::{CoreError, ValidationError};
use shopkeep_db::DbError;

/// API error returned from HTTP handlers.
///
/// ## Serialization
/// ```json
/// {
///   "code": "APP_NOT_READY",
///   "message": "Application is SETUP_REQUIRED; this route requires READY"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed (400)
    ValidationError,

    /// Database type or option this build cannot serve (400)
    UnsupportedDatabase,

    /// Completing setup with steps missing (400)
    SetupIncomplete,

    /// Resource not found (404)
    NotFound,

    /// Duplicate resource (409)
    Conflict,

    /// Route exists but has no implementation in this server (501)
    NotImplemented,

    /// Could not reach or migrate the database (502)
    DatabaseConnectionFailed,

    /// Route not admitted in the current application state (503)
    AppNotReady,

    /// No connection even after the self-healing retry (503)
    DatabaseUnavailable,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    /// HTTP status for this code.
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::ValidationError
            | ErrorCode::UnsupportedDatabase
            | ErrorCode::SetupIncomplete => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::NotImplemented => StatusCode::NOT_IMPLEMENTED,
            ErrorCode::DatabaseConnectionFailed => StatusCode::BAD_GATEWAY,
            ErrorCode::AppNotReady | ErrorCode::DatabaseUnavailable => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Conflict, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        self.code.status()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::Validation(e) => e.into(),
            CoreError::UnsupportedDatabase(_) => {
                ApiError::new(ErrorCode::UnsupportedDatabase, message)
            }
            CoreError::SetupIncomplete { .. } => ApiError::new(ErrorCode::SetupIncomplete, message),
            CoreError::AdmissionDenied { .. } => ApiError::new(
                ErrorCode::AppNotReady,
                format!("{message}. Complete setup before using this route"),
            ),
        }
    }
}

/// Converts validation errors to API errors.
impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Rejected(core) => core.into(),
            DbError::NotInitialized => ApiError::new(
                ErrorCode::DatabaseUnavailable,
                "Database is not available; check the database configuration",
            ),
            DbError::ConnectionFailed(_)
            | DbError::Timeout { .. }
            | DbError::MigrationFailed(_)
            | DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseConnectionFailed, err.to_string())
            }
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => {
                ApiError::conflict(format!("{} '{}' already exists", field, value))
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::validation("Invalid reference")
            }
            DbError::Store(e) => {
                tracing::error!("Setup config store failed: {}", e);
                ApiError::internal("Could not save setup progress")
            }
            DbError::QueryFailed(e) | DbError::Internal(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database operation failed: {}", e);
                ApiError::internal("Database operation failed")
            }
        }
    }
}

/// Converts body extraction failures (bad JSON, wrong content type).
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

/// Result type for HTTP handlers.
pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use shopkeep_core::{admit, Admission, AppStatus, SetupStep};

    #[test]
    fn test_status_mapping() {
        let cases: Vec<(ApiError, StatusCode)> = vec![
            (
                CoreError::UnsupportedDatabase("mysql".into()).into(),
                StatusCode::BAD_REQUEST,
            ),
            (
                CoreError::SetupIncomplete {
                    missing: vec![SetupStep::Shop],
                }
                .into(),
                StatusCode::BAD_REQUEST,
            ),
            (
                admit(&AppStatus::SetupRequired, Admission::READY)
                    .unwrap_err()
                    .into(),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (DbError::NotInitialized.into(), StatusCode::SERVICE_UNAVAILABLE),
            (
                DbError::ConnectionFailed("refused".into()).into(),
                StatusCode::BAD_GATEWAY,
            ),
            (DbError::Timeout { secs: 10 }.into(), StatusCode::BAD_GATEWAY),
            (
                DbError::duplicate("username", "admin").into(),
                StatusCode::CONFLICT,
            ),
            (DbError::not_found("Category", "x").into(), StatusCode::NOT_FOUND),
            (
                DbError::QueryFailed("syntax".into()).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.status(), status, "{err}");
        }
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err: ApiError = DbError::QueryFailed("relation \"users\" does not exist".into()).into();
        assert_eq!(err.code, ErrorCode::Internal);
        assert!(!err.message.contains("users"));
    }

    #[test]
    fn test_serialized_shape() {
        let err = ApiError::new(ErrorCode::AppNotReady, "not yet");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "APP_NOT_READY");
        assert_eq!(json["message"], "not yet");
    }
}
