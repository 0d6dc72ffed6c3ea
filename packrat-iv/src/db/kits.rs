//! Kit database operations
//!
//! Kit writes validate every item reference and maintain the kit_items
//! link table inside a single transaction, so a failed write leaves no
//! partial state. Reads enrich each kit with its resolved item records;
//! a membership row whose item no longer resolves degrades to the
//! "Unknown Item" placeholder instead of failing the read.

use std::collections::HashMap;

use packrat_common::db::models::{Item, Kit, KitDetail, KitItem};
use packrat_common::{Error, Result};
use sqlx::{Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use crate::thumbs;

/// Fields for a new kit
#[derive(Debug, Clone)]
pub struct NewKit {
    pub name: String,
    pub description: String,
    pub item_ids: Vec<Uuid>,
    pub price: f64,
    pub color: Option<String>,
}

/// Partial update; `None` fields retain prior values, except `color`,
/// which is always rewritten (empty or absent reads back as unset)
#[derive(Debug, Clone, Default)]
pub struct KitUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub item_ids: Option<Vec<Uuid>>,
    pub price: Option<f64>,
    pub color: Option<String>,
}

type KitRow = (Uuid, String, String, f64, Option<String>);

fn validate_price(price: f64) -> Result<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(Error::InvalidInput(
            "Price must be a non-negative number".to_string(),
        ));
    }
    Ok(())
}

/// Empty color tags are normalized to unset, never stored as ""
fn normalize_color(color: Option<String>) -> Option<String> {
    color.filter(|c| !c.is_empty())
}

/// Resolve every item id inside the transaction, rejecting on the first
/// miss (the error names that id)
async fn check_items_exist(
    tx: &mut Transaction<'_, Sqlite>,
    item_ids: &[Uuid],
) -> Result<()> {
    for item_id in item_ids {
        let found: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM items WHERE guid = ?")
            .bind(item_id)
            .fetch_optional(&mut **tx)
            .await?;
        if found.is_none() {
            return Err(Error::NotFound(format!(
                "Item with id {} not found",
                item_id
            )));
        }
    }
    Ok(())
}

async fn insert_links(
    tx: &mut Transaction<'_, Sqlite>,
    kit_id: Uuid,
    item_ids: &[Uuid],
) -> Result<()> {
    for item_id in item_ids {
        sqlx::query("INSERT OR IGNORE INTO kit_items (kit_id, item_id) VALUES (?, ?)")
            .bind(kit_id)
            .bind(item_id)
            .execute(&mut **tx)
            .await?;
    }
    Ok(())
}

/// Create a kit. Every item reference must resolve; check and insert
/// share one transaction, so a rejected write leaves no trace.
pub async fn create_kit(pool: &SqlitePool, fields: &NewKit) -> Result<Uuid> {
    if fields.item_ids.is_empty() {
        return Err(Error::InvalidInput(
            "A kit must reference at least one item".to_string(),
        ));
    }
    validate_price(fields.price)?;

    let mut tx = pool.begin().await?;
    check_items_exist(&mut tx, &fields.item_ids).await?;

    let guid = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO kits (guid, name, description, price, color) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(guid)
    .bind(&fields.name)
    .bind(&fields.description)
    .bind(fields.price)
    .bind(normalize_color(fields.color.clone()))
    .execute(&mut *tx)
    .await?;

    insert_links(&mut tx, guid, &fields.item_ids).await?;
    tx.commit().await?;

    Ok(guid)
}

/// List every kit in insertion order, optionally filtered by a substring
/// match on name or description, enriched with resolved item records
pub async fn list_kits(pool: &SqlitePool, search: Option<&str>) -> Result<Vec<KitDetail>> {
    let rows: Vec<KitRow> = match search {
        Some(q) => {
            let pattern = format!("%{}%", q);
            sqlx::query_as(
                "SELECT guid, name, description, price, color FROM kits
                 WHERE name LIKE ? OR description LIKE ?
                 ORDER BY created_at ASC, rowid ASC",
            )
            .bind(pattern.clone())
            .bind(pattern)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as(
                "SELECT guid, name, description, price, color FROM kits
                 ORDER BY created_at ASC, rowid ASC",
            )
            .fetch_all(pool)
            .await?
        }
    };

    let mut links = links_by_kit(pool).await?;
    let items = items_by_id(pool).await?;
    let categories = category_names(pool).await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let item_ids = links.remove(&row.0).unwrap_or_default();
            assemble(row, item_ids, &items, &categories)
        })
        .collect())
}

/// Get a single enriched kit; absence is not an error
pub async fn get_kit(pool: &SqlitePool, id: Uuid) -> Result<Option<KitDetail>> {
    let row: Option<KitRow> = sqlx::query_as(
        "SELECT guid, name, description, price, color FROM kits WHERE guid = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let item_ids: Vec<(Uuid,)> =
        sqlx::query_as("SELECT item_id FROM kit_items WHERE kit_id = ? ORDER BY rowid ASC")
            .bind(id)
            .fetch_all(pool)
            .await?;
    let item_ids: Vec<Uuid> = item_ids.into_iter().map(|(id,)| id).collect();

    let items = items_by_id(pool).await?;
    let categories = category_names(pool).await?;

    Ok(Some(assemble(row, item_ids, &items, &categories)))
}

/// Apply a partial update. A supplied item list is re-validated exactly
/// as in create and the link rows replaced in the same transaction.
pub async fn update_kit(pool: &SqlitePool, id: Uuid, update: &KitUpdate) -> Result<()> {
    let row: Option<KitRow> = sqlx::query_as(
        "SELECT guid, name, description, price, color FROM kits WHERE guid = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    let Some((_, prior_name, prior_description, prior_price, _)) = row else {
        return Err(Error::NotFound(format!("Kit with id {} not found", id)));
    };

    let price = update.price.unwrap_or(prior_price);
    validate_price(price)?;

    let mut tx = pool.begin().await?;

    if let Some(item_ids) = &update.item_ids {
        if item_ids.is_empty() {
            return Err(Error::InvalidInput(
                "A kit must reference at least one item".to_string(),
            ));
        }
        check_items_exist(&mut tx, item_ids).await?;
        sqlx::query("DELETE FROM kit_items WHERE kit_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        insert_links(&mut tx, id, item_ids).await?;
    }

    sqlx::query(
        r#"
        UPDATE kits
        SET name = ?, description = ?, price = ?, color = ?, updated_at = CURRENT_TIMESTAMP
        WHERE guid = ?
        "#,
    )
    .bind(update.name.as_ref().unwrap_or(&prior_name))
    .bind(update.description.as_ref().unwrap_or(&prior_description))
    .bind(price)
    .bind(normalize_color(update.color.clone()))
    .bind(id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

/// Unconditional deletion; link rows cascade with the kit
pub async fn remove_kit(pool: &SqlitePool, id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM kits WHERE guid = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Kit with id {} not found", id)));
    }
    Ok(())
}

async fn links_by_kit(pool: &SqlitePool) -> Result<HashMap<Uuid, Vec<Uuid>>> {
    let rows: Vec<(Uuid, Uuid)> =
        sqlx::query_as("SELECT kit_id, item_id FROM kit_items ORDER BY rowid ASC")
            .fetch_all(pool)
            .await?;

    let mut map: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for (kit_id, item_id) in rows {
        map.entry(kit_id).or_default().push(item_id);
    }
    Ok(map)
}

async fn items_by_id(pool: &SqlitePool) -> Result<HashMap<Uuid, Item>> {
    let rows: Vec<(Uuid, String, String, Uuid, Option<Uuid>, f64, Option<i64>)> =
        sqlx::query_as(
            "SELECT guid, name, description, category_id, thumbnail_id, price, purchased_date
             FROM items",
        )
        .fetch_all(pool)
        .await?;

    Ok(rows
        .into_iter()
        .map(
            |(guid, name, description, category_id, thumbnail_id, price, purchased_date)| {
                (
                    guid,
                    Item {
                        guid,
                        name,
                        description,
                        category_id,
                        thumbnail_id,
                        price,
                        purchased_date,
                    },
                )
            },
        )
        .collect())
}

async fn category_names(pool: &SqlitePool) -> Result<HashMap<Uuid, String>> {
    let rows: Vec<(Uuid, String)> = sqlx::query_as("SELECT guid, name FROM categories")
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().collect())
}

fn assemble(
    row: KitRow,
    item_ids: Vec<Uuid>,
    items: &HashMap<Uuid, Item>,
    categories: &HashMap<Uuid, String>,
) -> KitDetail {
    let (guid, name, description, price, color) = row;

    let resolved = item_ids
        .iter()
        .map(|item_id| match items.get(item_id) {
            Some(item) => KitItem {
                item: item.clone(),
                category_name: categories
                    .get(&item.category_id)
                    .cloned()
                    .unwrap_or_else(|| "Uncategorized".to_string()),
                thumbnail_url: item.thumbnail_id.map(thumbs::public_url),
            },
            None => KitItem::unknown(*item_id),
        })
        .collect();

    KitDetail {
        kit: Kit {
            guid,
            name,
            description,
            price,
            color,
            item_ids,
        },
        items: resolved,
    }
}
