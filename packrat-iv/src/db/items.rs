//! Item database operations
//!
//! Reads are enriched on the fly: category name, thumbnail URL and kit
//! membership are resolved per request and never persisted. Creation
//! trusts the caller's category reference; a reference that does not
//! resolve simply reads back as "Uncategorized".

use std::collections::HashMap;

use packrat_common::db::models::{Item, ItemDetail, KitRef};
use packrat_common::{Error, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::thumbs::{self, ThumbnailStore};

/// Fields for a new item
#[derive(Debug, Clone)]
pub struct NewItem {
    pub name: String,
    pub description: String,
    pub category_id: Uuid,
    pub thumbnail_id: Option<Uuid>,
    pub price: f64,
    pub purchased_date: Option<i64>,
}

/// Partial update; `None` fields retain their prior values
#[derive(Debug, Clone, Default)]
pub struct ItemUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub thumbnail_id: Option<Uuid>,
    pub price: Option<f64>,
    pub purchased_date: Option<i64>,
}

type ItemRow = (Uuid, String, String, Uuid, Option<Uuid>, f64, Option<i64>);

fn row_to_item(row: ItemRow) -> Item {
    let (guid, name, description, category_id, thumbnail_id, price, purchased_date) = row;
    Item {
        guid,
        name,
        description,
        category_id,
        thumbnail_id,
        price,
        purchased_date,
    }
}

fn validate_price(price: f64) -> Result<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(Error::InvalidInput(
            "Price must be a non-negative number".to_string(),
        ));
    }
    Ok(())
}

/// Create an item. The category reference is not verified here.
pub async fn create_item(pool: &SqlitePool, fields: &NewItem) -> Result<Uuid> {
    validate_price(fields.price)?;

    let guid = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO items (guid, name, description, category_id, thumbnail_id, price, purchased_date)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(guid)
    .bind(&fields.name)
    .bind(&fields.description)
    .bind(fields.category_id)
    .bind(fields.thumbnail_id)
    .bind(fields.price)
    .bind(fields.purchased_date)
    .execute(pool)
    .await?;

    Ok(guid)
}

/// List items in insertion order, optionally restricted to one category
/// and/or filtered by a substring match on name or description, enriched
/// for display
pub async fn list_items(
    pool: &SqlitePool,
    category_id: Option<Uuid>,
    search: Option<&str>,
) -> Result<Vec<ItemDetail>> {
    let mut sql = String::from(
        "SELECT guid, name, description, category_id, thumbnail_id, price, purchased_date
         FROM items",
    );
    let mut clauses: Vec<&str> = Vec::new();
    if category_id.is_some() {
        clauses.push("category_id = ?");
    }
    if search.is_some() {
        clauses.push("(name LIKE ? OR description LIKE ?)");
    }
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY created_at ASC, rowid ASC");

    let mut query = sqlx::query_as::<_, ItemRow>(&sql);
    if let Some(category_id) = category_id {
        query = query.bind(category_id);
    }
    if let Some(q) = search {
        let pattern = format!("%{}%", q);
        query = query.bind(pattern.clone()).bind(pattern);
    }

    let rows = query.fetch_all(pool).await?;

    let categories = category_names(pool).await?;
    let mut kits_by_item = kit_refs_by_item(pool).await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let item = row_to_item(row);
            let associated_kits = kits_by_item.remove(&item.guid).unwrap_or_default();
            enrich(item, &categories, associated_kits)
        })
        .collect())
}

/// Get a single enriched item; absence is not an error
pub async fn get_item(pool: &SqlitePool, id: Uuid) -> Result<Option<ItemDetail>> {
    let row: Option<ItemRow> = sqlx::query_as(
        "SELECT guid, name, description, category_id, thumbnail_id, price, purchased_date
         FROM items WHERE guid = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };
    let item = row_to_item(row);

    let categories = category_names(pool).await?;
    let associated_kits: Vec<(Uuid, String, Option<String>)> = sqlx::query_as(
        "SELECT k.guid, k.name, k.color
         FROM kit_items ki JOIN kits k ON k.guid = ki.kit_id
         WHERE ki.item_id = ?
         ORDER BY k.created_at ASC, k.rowid ASC",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    let associated_kits = associated_kits
        .into_iter()
        .map(|(guid, name, color)| KitRef { guid, name, color })
        .collect();

    Ok(Some(enrich(item, &categories, associated_kits)))
}

/// Apply a partial update; unsupplied fields retain prior values. The
/// category reference, if changed, is not re-validated.
pub async fn update_item(pool: &SqlitePool, id: Uuid, update: &ItemUpdate) -> Result<()> {
    let row: Option<ItemRow> = sqlx::query_as(
        "SELECT guid, name, description, category_id, thumbnail_id, price, purchased_date
         FROM items WHERE guid = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Err(Error::NotFound(format!("Item with id {} not found", id)));
    };
    let prior = row_to_item(row);

    let price = update.price.unwrap_or(prior.price);
    validate_price(price)?;

    sqlx::query(
        r#"
        UPDATE items
        SET name = ?, description = ?, category_id = ?, thumbnail_id = ?,
            price = ?, purchased_date = ?, updated_at = CURRENT_TIMESTAMP
        WHERE guid = ?
        "#,
    )
    .bind(update.name.as_ref().unwrap_or(&prior.name))
    .bind(update.description.as_ref().unwrap_or(&prior.description))
    .bind(update.category_id.unwrap_or(prior.category_id))
    .bind(update.thumbnail_id.or(prior.thumbnail_id))
    .bind(price)
    .bind(update.purchased_date.or(prior.purchased_date))
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Remove an item. Fails with InUse naming every referencing kit while
/// any kit's item set contains this id; otherwise deletes the stored
/// thumbnail (if present) and then the record.
pub async fn remove_item(pool: &SqlitePool, thumbs: &ThumbnailStore, id: Uuid) -> Result<()> {
    let kits: Vec<(String,)> = sqlx::query_as(
        "SELECT k.name
         FROM kit_items ki JOIN kits k ON k.guid = ki.kit_id
         WHERE ki.item_id = ?
         ORDER BY k.created_at ASC, k.rowid ASC",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    if !kits.is_empty() {
        return Err(Error::InUse {
            kits: kits.into_iter().map(|(name,)| name).collect(),
        });
    }

    let row: Option<(Option<Uuid>,)> =
        sqlx::query_as("SELECT thumbnail_id FROM items WHERE guid = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;

    let Some((thumbnail_id,)) = row else {
        return Err(Error::NotFound(format!("Item with id {} not found", id)));
    };

    // Image first, record second; the record is already confirmed deletable
    if let Some(thumbnail_id) = thumbnail_id {
        thumbs.remove(thumbnail_id)?;
    }

    sqlx::query("DELETE FROM items WHERE guid = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

/// All category names keyed by id, for read-time joins
async fn category_names(pool: &SqlitePool) -> Result<HashMap<Uuid, String>> {
    let rows: Vec<(Uuid, String)> = sqlx::query_as("SELECT guid, name FROM categories")
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().collect())
}

/// Reverse item -> kits relation, served by the kit_items index
async fn kit_refs_by_item(pool: &SqlitePool) -> Result<HashMap<Uuid, Vec<KitRef>>> {
    let rows: Vec<(Uuid, Uuid, String, Option<String>)> = sqlx::query_as(
        "SELECT ki.item_id, k.guid, k.name, k.color
         FROM kit_items ki JOIN kits k ON k.guid = ki.kit_id
         ORDER BY k.created_at ASC, k.rowid ASC",
    )
    .fetch_all(pool)
    .await?;

    let mut map: HashMap<Uuid, Vec<KitRef>> = HashMap::new();
    for (item_id, guid, name, color) in rows {
        map.entry(item_id)
            .or_default()
            .push(KitRef { guid, name, color });
    }
    Ok(map)
}

fn enrich(
    item: Item,
    categories: &HashMap<Uuid, String>,
    associated_kits: Vec<KitRef>,
) -> ItemDetail {
    let category_name = categories
        .get(&item.category_id)
        .cloned()
        .unwrap_or_else(|| "Uncategorized".to_string());
    let thumbnail_url = item.thumbnail_id.map(thumbs::public_url);

    ItemDetail {
        item,
        category_name,
        thumbnail_url,
        associated_kits,
    }
}
