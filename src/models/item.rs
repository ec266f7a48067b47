//! Item Domain Model
//!
//! The catalog item as owned by the backing store. The cache layer holds
//! JSON copies of these records with independent, TTL-bounded lifetimes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// == Item ==
/// A catalog item record.
///
/// Identity (`id`) is assigned by the backing store and stable for the life
/// of the record. `categories` carries the derived category names so a cached
/// copy is self-contained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Store-assigned identity
    pub id: u64,
    /// Display name
    pub name: String,
    /// Price in cents
    pub price: i64,
    /// Image reference
    pub image: String,
    /// Brand name
    pub brand: String,
    /// Units in stock
    pub stock: u32,
    /// Free-text description
    pub description: String,
    /// Derived category names
    pub categories: Vec<String>,
    /// Record creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

// == Item Draft ==
/// Item attributes without identity or timestamps; input to a create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDraft {
    pub name: String,
    pub price: i64,
    pub image: String,
    pub brand: String,
    pub stock: u32,
    pub description: String,
    pub categories: Vec<String>,
}

impl ItemDraft {
    /// Materializes the draft into an item with the given identity.
    pub fn into_item(self, id: u64) -> Item {
        let now = Utc::now();
        Item {
            id,
            name: self.name,
            price: self.price,
            image: self.image,
            brand: self.brand,
            stock: self.stock,
            description: self.description,
            categories: self.categories,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub fn sample_draft() -> ItemDraft {
        ItemDraft {
            name: "Espresso Machine".to_string(),
            price: 24_999,
            image: "espresso.png".to_string(),
            brand: "Crema".to_string(),
            stock: 12,
            description: "Semi-automatic espresso machine".to_string(),
            categories: vec!["kitchen".to_string(), "coffee".to_string()],
        }
    }

    #[test]
    fn test_draft_into_item_assigns_identity() {
        let item = sample_draft().into_item(42);
        assert_eq!(item.id, 42);
        assert_eq!(item.name, "Espresso Machine");
        assert_eq!(item.categories.len(), 2);
        assert_eq!(item.created_at, item.updated_at);
    }

    #[test]
    fn test_item_serde_round_trip() {
        let item = sample_draft().into_item(7);
        let json = serde_json::to_string(&item).unwrap();
        let back: Item = serde_json::from_str(&json).unwrap();
        assert_eq!(item, back);
    }
}
