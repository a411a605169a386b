//! # Database Error Types
//!
//! Error types for the bootstrap I/O layer.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  sqlx::Error / io::Error / serde_json::Error / CoreError               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ApiError (in apps/server) ← HTTP status + stable error code           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Setup wizard displays the message                                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use shopkeep_core::CoreError;
use thiserror::Error;

/// Bootstrap and database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// The request was rejected by a core rule before any I/O happened.
    ///
    /// ## When This Occurs
    /// - Missing host/database in the database step
    /// - Unsupported backend (mysql) or a table prefix
    /// - Completing setup with steps still missing
    #[error(transparent)]
    Rejected(#[from] CoreError),

    /// No connection is open.
    ///
    /// ## When This Occurs
    /// - Setup has not configured a database yet
    /// - The last connection attempt failed and the retry failed too
    #[error("Database is not initialized")]
    NotInitialized,

    /// Opening the connection failed.
    ///
    /// ## When This Occurs
    /// - Host unreachable or connection refused
    /// - Wrong credentials or unknown database
    /// - SQLite file cannot be created (missing directory, permissions)
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Opening the connection took longer than the configured bound.
    #[error("Connection timed out after {secs}s")]
    Timeout { secs: u64 },

    /// Migration failed.
    ///
    /// ## When This Occurs
    /// - Invalid SQL in migration
    /// - Migration checksum mismatch against an existing database
    /// - Insufficient privileges to create tables
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// The setup config file could not be written.
    #[error("Setup config store error: {0}")]
    Store(String),

    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Duplicate category name
    /// - Duplicate username or email
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Returns true if this error came from reaching the database server
    /// rather than from the request itself.
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            DbError::ConnectionFailed(_)
                | DbError::Timeout { .. }
                | DbError::MigrationFailed(_)
                | DbError::PoolExhausted
        )
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → constraint kind (Pg 23505 / SQLite UNIQUE)
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// sqlx::Error::Io / Tls       → DbError::ConnectionFailed
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message().to_string();

                match db_err.kind() {
                    sqlx::error::ErrorKind::UniqueViolation => {
                        // Pg reports the constraint name, SQLite only the message:
                        // "UNIQUE constraint failed: <table>.<column>"
                        let field = db_err
                            .constraint()
                            .map(str::to_string)
                            .or_else(|| {
                                msg.split("UNIQUE constraint failed: ")
                                    .nth(1)
                                    .map(str::to_string)
                            })
                            .unwrap_or_else(|| "unknown".to_string());
                        DbError::UniqueViolation {
                            field,
                            value: "unknown".to_string(),
                        }
                    }
                    sqlx::error::ErrorKind::ForeignKeyViolation => {
                        DbError::ForeignKeyViolation { message: msg }
                    }
                    _ => DbError::QueryFailed(msg),
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            sqlx::Error::Io(_) | sqlx::Error::Tls(_) => DbError::ConnectionFailed(err.to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

impl From<std::io::Error> for DbError {
    fn from(err: std::io::Error) -> Self {
        DbError::Store(err.to_string())
    }
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        DbError::Store(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use shopkeep_core::SetupStep;

    #[test]
    fn test_core_errors_pass_through() {
        let err: DbError = CoreError::SetupIncomplete {
            missing: vec![SetupStep::Admin],
        }
        .into();
        assert!(matches!(err, DbError::Rejected(_)));
        assert_eq!(err.to_string(), "Setup is incomplete; missing steps: admin");
    }

    #[test]
    fn test_connection_error_classification() {
        assert!(DbError::ConnectionFailed("refused".into()).is_connection_error());
        assert!(DbError::Timeout { secs: 10 }.is_connection_error());
        assert!(DbError::MigrationFailed("bad".into()).is_connection_error());
        assert!(!DbError::NotInitialized.is_connection_error());
        assert!(!DbError::duplicate("username", "admin").is_connection_error());
    }

    #[test]
    fn test_pool_closed_maps_to_connection_failed() {
        let err: DbError = sqlx::Error::PoolClosed.into();
        assert!(matches!(err, DbError::ConnectionFailed(_)));
    }
}
