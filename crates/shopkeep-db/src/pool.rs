//! # Database Pool Management
//!
//! Opens a PostgreSQL or SQLite pool from a [`DatabaseConfig`] collected at
//! runtime by the setup wizard.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Database Connection Pool                           │
//! │                                                                         │
//! │  DatabaseConfig (setup-config.json or POST /setup/database)            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::connect(config, settings) ← bounded by connect_timeout      │
//! │       │                                                                 │
//! │       ├── postgres ──► PgPool      (ssl flag → sslmode)                │
//! │       └── sqlite   ──► SqlitePool  (WAL, foreign keys, create file)    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::run_migrations() ← schema for the matching backend          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Handed to DynamicDatabase, shared by every request                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
};
use sqlx::{PgPool, SqlitePool};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::category::CategoryRepository;
use crate::repository::user::UserRepository;
use shopkeep_core::{DatabaseConfig, DatabaseType};

const IN_MEMORY: &str = ":memory:";

// =============================================================================
// Pool Settings
// =============================================================================

/// Process-level pool settings.
///
/// These come from the server's environment, not from the setup wizard:
/// the wizard only chooses *where* the database is.
///
/// ## Example
/// ```rust,ignore
/// let settings = PoolSettings::default()
///     .connect_timeout(Duration::from_secs(5))
///     .max_connections(20);
/// ```
#[derive(Debug, Clone)]
pub struct PoolSettings {
    /// Upper bound on opening the first connection.
    /// Default: 10 seconds
    pub connect_timeout: Duration,

    /// Maximum number of connections in the pool.
    /// Default: 10
    pub max_connections: u32,

    /// Idle timeout before closing a connection.
    /// Default: 10 minutes
    pub idle_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        PoolSettings {
            connect_timeout: Duration::from_secs(10),
            max_connections: 10,
            idle_timeout: Duration::from_secs(600),
        }
    }
}

impl PoolSettings {
    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }
}

// =============================================================================
// Database
// =============================================================================

/// An open connection pool to one of the supported backends.
///
/// Cloning is cheap: both variants are reference-counted pools.
#[derive(Debug, Clone)]
pub enum Database {
    Postgres(PgPool),
    Sqlite(SqlitePool),
}

impl Database {
    /// Opens a pool for `config`.
    ///
    /// ## What This Does
    /// 1. Builds backend-specific connect options
    /// 2. Opens the pool and one connection, bounded by `connect_timeout`
    ///
    /// Migrations are not run here; see [`Database::open`].
    ///
    /// ## Returns
    /// * `Ok(Database)` - a pool with at least one live connection
    /// * `Err(DbError::ConnectionFailed)` - unreachable, bad credentials, bad path
    /// * `Err(DbError::Timeout)` - the server did not answer in time
    /// * `Err(DbError::Rejected)` - unsupported backend
    pub async fn connect(config: &DatabaseConfig, settings: &PoolSettings) -> DbResult<Self> {
        info!(database = %config.display_target(), "Opening database connection");

        let attempt = async {
            match config.db_type {
                DatabaseType::Postgres => Self::connect_postgres(config, settings).await,
                DatabaseType::Sqlite => Self::connect_sqlite(config, settings).await,
                DatabaseType::Mysql => Err(DbError::Rejected(
                    shopkeep_core::CoreError::UnsupportedDatabase(config.db_type.to_string()),
                )),
            }
        };

        match tokio::time::timeout(settings.connect_timeout, attempt).await {
            Ok(result) => result,
            Err(_) => Err(DbError::Timeout {
                secs: settings.connect_timeout.as_secs(),
            }),
        }
    }

    /// Opens a pool and brings its schema up to date.
    ///
    /// The pool is closed again if migrations fail, so a failed call never
    /// leaves a half-usable handle behind.
    pub async fn open(config: &DatabaseConfig, settings: &PoolSettings) -> DbResult<Self> {
        let db = Self::connect(config, settings).await?;

        if let Err(e) = db.run_migrations().await {
            db.close().await;
            return Err(e);
        }

        Ok(db)
    }

    async fn connect_postgres(config: &DatabaseConfig, settings: &PoolSettings) -> DbResult<Self> {
        let port = u16::try_from(config.port)
            .map_err(|_| DbError::ConnectionFailed(format!("invalid port {}", config.port)))?;

        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(port)
            .username(&config.username)
            .password(&config.password)
            .database(&config.database)
            .ssl_mode(if config.ssl {
                PgSslMode::Require
            } else {
                PgSslMode::Disable
            })
            .application_name("shopkeep");

        debug!(ssl = config.ssl, "Postgres connect options configured");

        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(settings.connect_timeout)
            .idle_timeout(Some(settings.idle_timeout))
            .connect_with(options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = settings.max_connections,
            "Postgres pool created"
        );
        Ok(Database::Postgres(pool))
    }

    async fn connect_sqlite(config: &DatabaseConfig, settings: &PoolSettings) -> DbResult<Self> {
        let in_memory = config.database.trim() == IN_MEMORY;

        let options = if in_memory {
            IN_MEMORY.parse::<SqliteConnectOptions>()?
        } else {
            SqliteConnectOptions::new().filename(config.database.trim())
        };

        let options = options
            // WAL mode: readers don't block writers, writers don't block readers
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            // SQLite has them disabled by default for backwards compatibility
            .foreign_keys(true)
            .create_if_missing(true);

        // Every connection to :memory: is a separate database
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
                .max_connections(settings.max_connections)
                .idle_timeout(Some(settings.idle_timeout))
        };

        let pool = pool_options
            .acquire_timeout(settings.connect_timeout)
            .connect_with(options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(path = %config.database, "SQLite pool created");
        Ok(Database::Sqlite(pool))
    }

    /// Runs database migrations for this backend.
    ///
    /// Idempotent: already-applied migrations are skipped.
    pub async fn run_migrations(&self) -> DbResult<()> {
        info!(backend = %self.backend(), "Running database migrations");
        migrations::run_migrations(self).await?;
        info!("Migrations complete");
        Ok(())
    }

    /// The backend this pool talks to.
    pub fn backend(&self) -> DatabaseType {
        match self {
            Database::Postgres(_) => DatabaseType::Postgres,
            Database::Sqlite(_) => DatabaseType::Sqlite,
        }
    }

    /// Returns the category repository.
    pub fn categories(&self) -> CategoryRepository {
        CategoryRepository::new(self.clone())
    }

    /// Returns the user repository.
    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.clone())
    }

    /// Closes the pool.
    ///
    /// ## Note
    /// After calling close, all repository operations fail with
    /// `ConnectionFailed("Pool is closed")`.
    pub async fn close(&self) {
        info!(backend = %self.backend(), "Closing database connection pool");
        match self {
            Database::Postgres(pool) => pool.close().await,
            Database::Sqlite(pool) => pool.close().await,
        }
    }

    /// Returns true if the pool is closed.
    pub fn is_closed(&self) -> bool {
        match self {
            Database::Postgres(pool) => pool.is_closed(),
            Database::Sqlite(pool) => pool.is_closed(),
        }
    }

    /// Checks if the database is healthy (can execute queries).
    pub async fn health_check(&self) -> bool {
        let result = match self {
            Database::Postgres(pool) => sqlx::query("SELECT 1").execute(pool).await.map(|_| ()),
            Database::Sqlite(pool) => sqlx::query("SELECT 1").execute(pool).await.map(|_| ()),
        };
        result.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database() {
        let db = Database::open(&DatabaseConfig::sqlite(":memory:"), &PoolSettings::default())
            .await
            .unwrap();

        assert_eq!(db.backend(), DatabaseType::Sqlite);
        assert!(db.health_check().await);

        db.close().await;
        assert!(db.is_closed());
        assert!(!db.health_check().await);
    }

    #[tokio::test]
    async fn test_sqlite_file_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shop.db");
        let config = DatabaseConfig::sqlite(path.to_string_lossy());

        let db = Database::open(&config, &PoolSettings::default()).await.unwrap();
        assert!(path.exists());
        db.close().await;
    }

    #[tokio::test]
    async fn test_sqlite_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no").join("such").join("shop.db");
        let config = DatabaseConfig::sqlite(path.to_string_lossy());

        let err = Database::connect(&config, &PoolSettings::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ConnectionFailed(_)), "{err:?}");
    }

    #[tokio::test]
    async fn test_postgres_unreachable_fails() {
        let config = DatabaseConfig::postgres("127.0.0.1", 1, "shop", "secret", "shop");
        let settings = PoolSettings::default().connect_timeout(Duration::from_secs(3));

        let err = Database::connect(&config, &settings).await.unwrap_err();
        assert!(err.is_connection_error(), "{err:?}");
    }

    #[tokio::test]
    async fn test_mysql_is_rejected() {
        let mut config = DatabaseConfig::postgres("localhost", 3306, "u", "p", "d");
        config.db_type = DatabaseType::Mysql;

        let err = Database::connect(&config, &PoolSettings::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Rejected(_)));
    }

    #[test]
    fn test_settings_builder() {
        let settings = PoolSettings::default()
            .connect_timeout(Duration::from_secs(3))
            .max_connections(2);

        assert_eq!(settings.connect_timeout, Duration::from_secs(3));
        assert_eq!(settings.max_connections, 2);
    }
}
