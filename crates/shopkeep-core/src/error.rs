//! # Error Types
//!
//! Domain-specific error types for shopkeep-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  shopkeep-core errors (this file)                                      │
//! │  ├── CoreError        - Setup flow and admission failures              │
//! │  └── ValidationError  - Setup payload validation failures              │
//! │                                                                         │
//! │  shopkeep-db errors (separate crate)                                   │
//! │  └── DbError          - Connection, migration, store failures          │
//! │                                                                         │
//! │  Server errors (apps/server)                                           │
//! │  └── ApiError         - What the HTTP caller sees                      │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Frontend     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::admission::Admission;
use crate::types::SetupStep;

// =============================================================================
// Core Error
// =============================================================================

/// Errors raised by the bootstrap rules.
#[derive(Debug, Error)]
pub enum CoreError {
    /// `complete` was invoked before every prerequisite step finished.
    ///
    /// ## When This Occurs
    /// ```text
    /// POST /setup/complete
    ///      │
    ///      ▼
    /// database ✓  shop ✗  admin ✗
    ///      │
    ///      ▼
    /// SetupIncomplete { missing: [Shop, Admin] }   (nothing persisted)
    /// ```
    #[error("Setup is incomplete; missing steps: {}", format_steps(.missing))]
    SetupIncomplete { missing: Vec<SetupStep> },

    /// A route was requested while the application is in the wrong state.
    ///
    /// Not retryable: the caller must finish setup (or fix the database)
    /// before asking again.
    #[error("Application is {current}; this route requires {required}")]
    AdmissionDenied { required: Admission, current: String },

    /// The database type is recognised but has no driver in this build.
    #[error("Unsupported database type: {0}")]
    UnsupportedDatabase(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

fn format_steps(steps: &[SetupStep]) -> String {
    steps
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when a setup payload doesn't meet requirements.
/// No state is mutated when one of these is returned.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., malformed email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_incomplete_lists_missing_steps() {
        let err = CoreError::SetupIncomplete {
            missing: vec![SetupStep::Shop, SetupStep::Admin],
        };
        assert_eq!(
            err.to_string(),
            "Setup is incomplete; missing steps: shop, admin"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "host".to_string(),
        };
        assert_eq!(err.to_string(), "host is required");

        let err = ValidationError::TooShort {
            field: "password".to_string(),
            min: 8,
        };
        assert_eq!(err.to_string(), "password must be at least 8 characters");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
