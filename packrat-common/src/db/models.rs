//! Database models and enriched view models
//!
//! Raw records mirror the persisted tables. The enriched types are
//! read-time projections only: category name, thumbnail URL, and kit
//! membership are resolved fresh on every read and never persisted.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Uniquely named grouping for items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub guid: Uuid,
    pub name: String,
}

/// Purchasable/owned object with price, category, optional image and
/// purchase date (Unix milliseconds)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub guid: Uuid,
    pub name: String,
    pub description: String,
    pub category_id: Uuid,
    pub thumbnail_id: Option<Uuid>,
    pub price: f64,
    pub purchased_date: Option<i64>,
}

/// Named, priced bundle referencing one or more items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Kit {
    pub guid: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub color: Option<String>,
    pub item_ids: Vec<Uuid>,
}

/// Minimal kit reference attached to enriched items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KitRef {
    pub guid: Uuid,
    pub name: String,
    pub color: Option<String>,
}

/// Item enriched for display: category name (default "Uncategorized"),
/// resolved thumbnail URL, and the kits currently referencing it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDetail {
    #[serde(flatten)]
    pub item: Item,
    pub category_name: String,
    pub thumbnail_url: Option<String>,
    pub associated_kits: Vec<KitRef>,
}

/// Item as it appears inside an enriched kit (no reverse kit relation)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KitItem {
    #[serde(flatten)]
    pub item: Item,
    pub category_name: String,
    pub thumbnail_url: Option<String>,
}

impl KitItem {
    /// Placeholder substituted for an item id that no longer resolves,
    /// so a stale membership row degrades the display instead of failing
    /// the whole read.
    pub fn unknown(item_id: Uuid) -> Self {
        Self {
            item: Item {
                guid: item_id,
                name: "Unknown Item".to_string(),
                description: String::new(),
                category_id: Uuid::nil(),
                thumbnail_id: None,
                price: 0.0,
                purchased_date: None,
            },
            category_name: "N/A".to_string(),
            thumbnail_url: None,
        }
    }
}

/// Kit enriched with its resolved item records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KitDetail {
    #[serde(flatten)]
    pub kit: Kit,
    pub items: Vec<KitItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_item_placeholder_shape() {
        let id = Uuid::new_v4();
        let placeholder = KitItem::unknown(id);

        assert_eq!(placeholder.item.guid, id);
        assert_eq!(placeholder.item.name, "Unknown Item");
        assert_eq!(placeholder.item.price, 0.0);
        assert_eq!(placeholder.category_name, "N/A");
        assert!(placeholder.thumbnail_url.is_none());
    }

    #[test]
    fn item_detail_serializes_flat() {
        let detail = ItemDetail {
            item: Item {
                guid: Uuid::new_v4(),
                name: "Cable".to_string(),
                description: "USB-C".to_string(),
                category_id: Uuid::new_v4(),
                thumbnail_id: None,
                price: 5.0,
                purchased_date: None,
            },
            category_name: "Electronics".to_string(),
            thumbnail_url: None,
            associated_kits: vec![],
        };

        let json = serde_json::to_value(&detail).unwrap();
        // Flattened: item fields live at the top level next to derived ones
        assert_eq!(json["name"], "Cable");
        assert_eq!(json["category_name"], "Electronics");
        assert!(json["associated_kits"].as_array().unwrap().is_empty());
    }
}
