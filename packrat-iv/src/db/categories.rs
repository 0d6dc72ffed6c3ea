//! Category database operations
//!
//! Categories are created and listed only; there is no update or delete
//! path. Items referencing a missing category read as "Uncategorized".

use packrat_common::db::models::Category;
use packrat_common::{Error, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

/// Create a category, rejecting a case-sensitive exact name match
pub async fn create_category(pool: &SqlitePool, name: &str) -> Result<Uuid> {
    let existing: Option<(Uuid,)> =
        sqlx::query_as("SELECT guid FROM categories WHERE name = ?")
            .bind(name)
            .fetch_optional(pool)
            .await?;

    if existing.is_some() {
        return Err(Error::DuplicateName(name.to_string()));
    }

    let guid = Uuid::new_v4();
    sqlx::query("INSERT INTO categories (guid, name) VALUES (?, ?)")
        .bind(guid)
        .bind(name)
        .execute(pool)
        .await?;

    Ok(guid)
}

/// List categories in insertion order, optionally filtered by a
/// case-insensitive substring match on the name
pub async fn list_categories(
    pool: &SqlitePool,
    search: Option<&str>,
) -> Result<Vec<Category>> {
    let rows: Vec<(Uuid, String)> = match search {
        Some(q) => {
            sqlx::query_as(
                "SELECT guid, name FROM categories
                 WHERE name LIKE ?
                 ORDER BY created_at ASC, rowid ASC",
            )
            .bind(format!("%{}%", q))
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as(
                "SELECT guid, name FROM categories ORDER BY created_at ASC, rowid ASC",
            )
            .fetch_all(pool)
            .await?
        }
    };

    Ok(rows
        .into_iter()
        .map(|(guid, name)| Category { guid, name })
        .collect())
}

/// Get a category by id; absence is not an error
pub async fn get_category(pool: &SqlitePool, id: Uuid) -> Result<Option<Category>> {
    let row: Option<(Uuid, String)> =
        sqlx::query_as("SELECT guid, name FROM categories WHERE guid = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;

    Ok(row.map(|(guid, name)| Category { guid, name }))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_pool() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        packrat_common::db::init::create_tables(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_create_and_get_category() {
        let pool = setup_pool().await;

        let guid = create_category(&pool, "Electronics").await.unwrap();
        let loaded = get_category(&pool, guid).await.unwrap().unwrap();

        assert_eq!(loaded.guid, guid);
        assert_eq!(loaded.name, "Electronics");
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let pool = setup_pool().await;

        create_category(&pool, "Tools").await.unwrap();
        let err = create_category(&pool, "Tools").await.unwrap_err();

        assert!(matches!(err, Error::DuplicateName(name) if name == "Tools"));

        // Exactly one row survived
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_name_match_is_case_sensitive() {
        let pool = setup_pool().await;

        create_category(&pool, "Tools").await.unwrap();
        // Different case is a different name
        create_category(&pool, "tools").await.unwrap();

        let all = list_categories(&pool, None).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_list_in_insertion_order_with_search() {
        let pool = setup_pool().await;

        create_category(&pool, "Cables").await.unwrap();
        create_category(&pool, "Books").await.unwrap();
        create_category(&pool, "Camping").await.unwrap();

        let all = list_categories(&pool, None).await.unwrap();
        let names: Vec<_> = all.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Cables", "Books", "Camping"]);

        let filtered = list_categories(&pool, Some("ca")).await.unwrap();
        let names: Vec<_> = filtered.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Cables", "Camping"]);
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let pool = setup_pool().await;
        assert!(get_category(&pool, Uuid::new_v4()).await.unwrap().is_none());
    }
}
