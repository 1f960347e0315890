//! # Category Repository
//!
//! Product categories (engine oil, gear oil, coolant, ...).

use lubri_core::validation::validate_name;
use lubri_core::Category;
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{DbError, DbResult};

#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    pub async fn list(&self) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name FROM categories ORDER BY name COLLATE NOCASE",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Adds a category. Names are unique.
    pub async fn insert(&self, name: &str) -> DbResult<Category> {
        validate_name("name", name)?;
        let name = name.trim();

        let result = sqlx::query("INSERT INTO categories (name) VALUES (?1)")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::UniqueViolation { field, .. } => DbError::duplicate(field, name),
                other => other,
            })?;

        let id = result.last_insert_rowid();
        info!(category_id = id, name = %name, "Category added");

        Ok(Category {
            id,
            name: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig, DbError};

    #[tokio::test]
    async fn test_insert_and_list() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.categories().insert("Gear Oil").await.unwrap();
        db.categories().insert("engine oil").await.unwrap();

        let names: Vec<String> = db
            .categories()
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["engine oil", "Gear Oil"]);
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.categories().insert("Coolant").await.unwrap();

        let err = db.categories().insert("Coolant").await.unwrap_err();
        match err {
            DbError::UniqueViolation { value, .. } => assert_eq!(value, "Coolant"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
