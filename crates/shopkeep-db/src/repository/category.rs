//! # Category Repository
//!
//! Database operations for product categories.

use sqlx::FromRow;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::pool::Database;
use shopkeep_core::{Category, NewCategory};

#[derive(Debug, FromRow)]
struct CategoryRow {
    id: String,
    name: String,
    description: Option<String>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            name: row.name,
            description: row.description,
        }
    }
}

/// Repository for category database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.categories();
/// let created = repo.create(&NewCategory { name: "Snacks".into(), description: None }).await?;
/// let all = repo.list().await?;
/// ```
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    db: Database,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(db: Database) -> Self {
        CategoryRepository { db }
    }

    /// Lists all categories ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Category>> {
        let rows: Vec<CategoryRow> = match &self.db {
            Database::Postgres(pool) => {
                sqlx::query_as("SELECT id, name, description FROM categories ORDER BY name")
                    .fetch_all(pool)
                    .await?
            }
            Database::Sqlite(pool) => {
                sqlx::query_as(
                    "SELECT id, name, description FROM categories ORDER BY name COLLATE NOCASE",
                )
                .fetch_all(pool)
                .await?
            }
        };

        debug!(count = rows.len(), "Listed categories");
        Ok(rows.into_iter().map(Category::from).collect())
    }

    /// Gets a category by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Category>> {
        let row: Option<CategoryRow> = match &self.db {
            Database::Postgres(pool) => {
                sqlx::query_as("SELECT id, name, description FROM categories WHERE id = $1")
                    .bind(id)
                    .fetch_optional(pool)
                    .await?
            }
            Database::Sqlite(pool) => {
                sqlx::query_as("SELECT id, name, description FROM categories WHERE id = ?1")
                    .bind(id)
                    .fetch_optional(pool)
                    .await?
            }
        };

        Ok(row.map(Category::from))
    }

    /// Inserts a new category.
    ///
    /// ## Returns
    /// * `Ok(Category)` - the stored row with its generated ID
    /// * `Err(DbError::UniqueViolation)` - a category with this name exists
    pub async fn create(&self, category: &NewCategory) -> DbResult<Category> {
        let id = Uuid::new_v4().to_string();
        let name = category.name.trim().to_string();
        let description = category
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        let result = match &self.db {
            Database::Postgres(pool) => {
                sqlx::query("INSERT INTO categories (id, name, description) VALUES ($1, $2, $3)")
                    .bind(&id)
                    .bind(&name)
                    .bind(&description)
                    .execute(pool)
                    .await
                    .map(|_| ())
            }
            Database::Sqlite(pool) => {
                sqlx::query("INSERT INTO categories (id, name, description) VALUES (?1, ?2, ?3)")
                    .bind(&id)
                    .bind(&name)
                    .bind(&description)
                    .execute(pool)
                    .await
                    .map(|_| ())
            }
        };

        match result.map_err(DbError::from) {
            Ok(()) => {}
            Err(DbError::UniqueViolation { .. }) => return Err(DbError::duplicate("name", name)),
            Err(e) => return Err(e),
        }

        debug!(id = %id, name = %name, "Category created");
        Ok(Category {
            id,
            name,
            description,
        })
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

    fn new_category(name: &str) -> NewCategory {
        NewCategory {
            name: name.to_string(),
            description: Some("  ".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let repo = test_db().await.categories();

        let snacks = repo.create(&new_category("Snacks")).await.unwrap();
        repo.create(&new_category("beverages")).await.unwrap();

        assert_eq!(snacks.description, None);

        let names: Vec<String> = repo.list().await.unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["beverages", "Snacks"]);

        let found = repo.get_by_id(&snacks.id).await.unwrap();
        assert_eq!(found, Some(snacks));
    }

    #[tokio::test]
    async fn test_duplicate_name_conflicts() {
        let repo = test_db().await.categories();
        repo.create(&new_category("Snacks")).await.unwrap();

        let err = repo.create(&new_category("Snacks")).await.unwrap_err();
        assert!(
            matches!(err, DbError::UniqueViolation { ref field, .. } if field == "name"),
            "{err:?}"
        );
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let repo = test_db().await.categories();
        assert_eq!(repo.get_by_id("nope").await.unwrap(), None);
    }
}
