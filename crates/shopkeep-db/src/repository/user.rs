//! # User Repository
//!
//! Staff accounts. Setup only needs the first `admin`; the rest of account
//! management lives outside the bootstrap.
//!
//! Passwords arrive here already hashed.

use tracing::info;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::pool::Database;

/// Role column value for administrators.
pub const ROLE_ADMIN: &str = "admin";

/// A user row to insert.
#[derive(Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub full_name: Option<String>,
    pub role: &'static str,
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("full_name", &self.full_name)
            .field("role", &self.role)
            .finish()
    }
}

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: Database,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(db: Database) -> Self {
        UserRepository { db }
    }

    /// Returns true if any active admin account exists.
    pub async fn admin_exists(&self) -> DbResult<bool> {
        let count: i64 = match &self.db {
            Database::Postgres(pool) => {
                sqlx::query_scalar(
                    "SELECT COUNT(*) FROM users WHERE role = $1 AND is_active = TRUE",
                )
                .bind(ROLE_ADMIN)
                .fetch_one(pool)
                .await?
            }
            Database::Sqlite(pool) => {
                sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = ?1 AND is_active = 1")
                    .bind(ROLE_ADMIN)
                    .fetch_one(pool)
                    .await?
            }
        };

        Ok(count > 0)
    }

    /// Inserts a user and returns its ID.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - username or email already taken
    pub async fn create(&self, user: &NewUser) -> DbResult<String> {
        let id = Uuid::new_v4().to_string();

        let result = match &self.db {
            Database::Postgres(pool) => {
                sqlx::query(
                    "INSERT INTO users (id, username, email, password_hash, full_name, role) \
                     VALUES ($1, $2, $3, $4, $5, $6)",
                )
                .bind(&id)
                .bind(&user.username)
                .bind(&user.email)
                .bind(&user.password_hash)
                .bind(&user.full_name)
                .bind(user.role)
                .execute(pool)
                .await
                .map(|_| ())
            }
            Database::Sqlite(pool) => {
                sqlx::query(
                    "INSERT INTO users (id, username, email, password_hash, full_name, role) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                )
                .bind(&id)
                .bind(&user.username)
                .bind(&user.email)
                .bind(&user.password_hash)
                .bind(&user.full_name)
                .bind(user.role)
                .execute(pool)
                .await
                .map(|_| ())
            }
        };

        if let Err(e) = result {
            return Err(match DbError::from(e) {
                DbError::UniqueViolation { field, .. } if field.contains("email") => {
                    DbError::duplicate("email", &user.email)
                }
                DbError::UniqueViolation { .. } => DbError::duplicate("username", &user.username),
                other => other,
            });
        }

        info!(id = %id, username = %user.username, role = user.role, "User created");
        Ok(id)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::PoolSettings;
    use shopkeep_core::DatabaseConfig;

    async fn test_db() -> Database {
        Database::open(&DatabaseConfig::sqlite(":memory:"), &PoolSettings::default())
            .await
            .unwrap()
    }

    fn admin(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$v=19$placeholder".to_string(),
            full_name: None,
            role: ROLE_ADMIN,
        }
    }

    #[tokio::test]
    async fn test_admin_exists_after_create() {
        let repo = test_db().await.users();
        assert!(!repo.admin_exists().await.unwrap());

        let id = repo.create(&admin("admin", "admin@shop.example")).await.unwrap();
        assert!(!id.is_empty());
        assert!(repo.admin_exists().await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_username_and_email() {
        let repo = test_db().await.users();
        repo.create(&admin("admin", "admin@shop.example")).await.unwrap();

        let err = repo
            .create(&admin("admin", "other@shop.example"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { ref field, .. } if field == "username"));

        let err = repo
            .create(&admin("second", "admin@shop.example"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { ref field, .. } if field == "email"));
    }

    #[test]
    fn test_debug_redacts_hash() {
        let debug = format!("{:?}", admin("admin", "a@b.co"));
        assert!(!debug.contains("argon2"));
    }
}
