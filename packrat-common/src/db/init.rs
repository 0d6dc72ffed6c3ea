//! Database initialization
//!
//! Creates the database file on first run and brings the schema up
//! idempotently. All `create_*_table` functions are safe to call on an
//! existing database and are reused directly by tests against in-memory
//! SQLite.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // mode=rwc: read, write, create
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable foreign keys (kit_items rows cascade with their kit)
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;

    // WAL allows concurrent readers with one writer
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    create_tables(&pool).await?;

    Ok(pool)
}

/// Create all application tables (idempotent)
pub async fn create_tables(pool: &SqlitePool) -> Result<()> {
    create_settings_table(pool).await?;
    create_categories_table(pool).await?;
    create_items_table(pool).await?;
    create_kits_table(pool).await?;
    create_kit_items_table(pool).await?;
    Ok(())
}

/// Key/value settings (api_token_hash lives here)
pub async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_categories_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS categories (
            guid TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Name collisions are rejected before insert; the unique index backs
    // that check at the storage level as well.
    sqlx::query("CREATE UNIQUE INDEX IF NOT EXISTS idx_categories_name ON categories(name)")
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn create_items_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS items (
            guid TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT NOT NULL,
            category_id TEXT NOT NULL,
            thumbnail_id TEXT,
            price REAL NOT NULL,
            purchased_date INTEGER,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Not used for enforcement; items may share names
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_items_name ON items(name)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_items_category_id ON items(category_id)")
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn create_kits_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS kits (
            guid TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT NOT NULL,
            price REAL NOT NULL,
            color TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_kits_name ON kits(name)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Kit membership link table, maintained transactionally with every kit
/// write. `item_id` intentionally carries no foreign key: a kit row whose
/// item no longer resolves reads as the "Unknown Item" placeholder instead
/// of failing, and the item deletion guard is the integrity mechanism.
pub async fn create_kit_items_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS kit_items (
            kit_id TEXT NOT NULL REFERENCES kits(guid) ON DELETE CASCADE,
            item_id TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (kit_id, item_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_kit_items_item_id ON kit_items(item_id)")
        .execute(pool)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_tables_idempotent() {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");

        create_tables(&pool).await.expect("First create failed");
        create_tables(&pool).await.expect("Second create failed");

        // All five tables present
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'
             AND name IN ('settings', 'categories', 'items', 'kits', 'kit_items')",
        )
        .fetch_one(&pool)
        .await
        .unwrap();

        assert_eq!(count, 5);
    }

    #[tokio::test]
    async fn test_init_database_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("data").join("packrat.db");

        let pool = init_database(&db_path).await.expect("init failed");
        assert!(db_path.exists());

        // Foreign keys enabled
        let fk: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(fk, 1);
    }
}
