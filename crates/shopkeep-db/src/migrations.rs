//! # Database Migrations
//!
//! Embedded SQL migrations for Shopkeep, one directory per backend.
//!
//! ## How Migrations Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Migration Process                                  │
//! │                                                                         │
//! │  configure_and_initialize / boot                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Pick migrator by backend                                              │
//! │       ├── Postgres ──► migrations/postgres/                            │
//! │       └── SQLite   ──► migrations/sqlite/                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Compare embedded migrations vs _sqlx_migrations                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Run pending migrations in order, record each one                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Handle becomes live (READY)                                           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Adding New Migrations
//!
//! 1. Add the file to BOTH `migrations/postgres/` and `migrations/sqlite/`
//!    with the same sequence number
//! 2. Name format: `NNNN_description.sql`
//! 3. **NEVER** modify existing migrations - always add new ones

use sqlx::migrate::Migrator;
use tracing::info;

use crate::error::DbResult;
use crate::pool::Database;

/// Embedded migrations from the `migrations/postgres` directory.
static POSTGRES_MIGRATOR: Migrator = sqlx::migrate!("../../migrations/postgres");

/// Embedded migrations from the `migrations/sqlite` directory.
static SQLITE_MIGRATOR: Migrator = sqlx::migrate!("../../migrations/sqlite");

fn migrator_for(db: &Database) -> &'static Migrator {
    match db {
        Database::Postgres(_) => &POSTGRES_MIGRATOR,
        Database::Sqlite(_) => &SQLITE_MIGRATOR,
    }
}

/// Runs all pending database migrations.
///
/// ## Safety
/// - Idempotent: safe to run multiple times
/// - Transactional: each migration runs in a transaction
/// - Ordered: migrations run in filename order
pub async fn run_migrations(db: &Database) -> DbResult<()> {
    info!("Checking for pending migrations");

    match db {
        Database::Postgres(pool) => POSTGRES_MIGRATOR.run(pool).await?,
        Database::Sqlite(pool) => SQLITE_MIGRATOR.run(pool).await?,
    }

    info!("All migrations applied successfully");
    Ok(())
}

/// Returns information about migrations.
///
/// ## Returns
/// Tuple of (total_migrations, applied_migrations)
pub async fn migration_status(db: &Database) -> DbResult<(usize, usize)> {
    let total = migrator_for(db).migrations.len();

    let query = "SELECT COUNT(*) FROM _sqlx_migrations";
    let applied: i64 = match db {
        Database::Postgres(pool) => sqlx::query_scalar(query).fetch_one(pool).await?,
        Database::Sqlite(pool) => sqlx::query_scalar(query).fetch_one(pool).await?,
    };

    Ok((total, applied as usize))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::PoolSettings;
    use shopkeep_core::DatabaseConfig;

    #[tokio::test]
    async fn test_all_migrations_applied() {
        let db = Database::open(&DatabaseConfig::sqlite(":memory:"), &PoolSettings::default())
            .await
            .unwrap();

        let (total, applied) = migration_status(&db).await.unwrap();
        assert!(total > 0);
        assert_eq!(total, applied);
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let db = Database::open(&DatabaseConfig::sqlite(":memory:"), &PoolSettings::default())
            .await
            .unwrap();

        run_migrations(&db).await.unwrap();
        let (total, applied) = migration_status(&db).await.unwrap();
        assert_eq!(total, applied);
    }

    #[test]
    fn test_backends_ship_the_same_versions() {
        let pg: Vec<i64> = POSTGRES_MIGRATOR.iter().map(|m| m.version).collect();
        let sqlite: Vec<i64> = SQLITE_MIGRATOR.iter().map(|m| m.version).collect();
        assert_eq!(pg, sqlite);
    }
}
