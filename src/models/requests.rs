//! Request DTOs for the catalog service API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

use crate::models::ItemDraft;

/// Request body for creating an item (POST /items)
#[derive(Debug, Clone, Deserialize)]
pub struct CreateItemRequest {
    /// Display name
    pub name: String,
    /// Price in cents
    pub price: i64,
    /// Image reference
    #[serde(default)]
    pub image: String,
    /// Brand name
    #[serde(default)]
    pub brand: String,
    /// Units in stock
    #[serde(default)]
    pub stock: u32,
    /// Free-text description
    #[serde(default)]
    pub description: String,
    /// Category names
    #[serde(default)]
    pub categories: Vec<String>,
}

impl CreateItemRequest {
    /// Validates the request data.
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.name.is_empty() {
            return Some("Item name cannot be empty".to_string());
        }
        if self.name.len() > 256 {
            return Some("Item name exceeds maximum length of 256 characters".to_string());
        }
        if self.price < 0 {
            return Some("Item price cannot be negative".to_string());
        }
        None
    }

    /// Converts the request into a store draft.
    pub fn into_draft(self) -> ItemDraft {
        ItemDraft {
            name: self.name,
            price: self.price,
            image: self.image,
            brand: self.brand,
            stock: self.stock,
            description: self.description,
            categories: self.categories,
        }
    }
}

/// Request body for updating an item (PUT /items/:id)
///
/// Carries the full replacement attribute set; the id comes from the path.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateItemRequest {
    pub name: String,
    pub price: i64,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub categories: Vec<String>,
}

impl UpdateItemRequest {
    /// Validates the request data.
    pub fn validate(&self) -> Option<String> {
        if self.name.is_empty() {
            return Some("Item name cannot be empty".to_string());
        }
        if self.price < 0 {
            return Some("Item price cannot be negative".to_string());
        }
        None
    }
}

/// Request body for a batched lookup (POST /items/batch)
#[derive(Debug, Clone, Deserialize)]
pub struct BatchLookupRequest {
    /// Item ids to resolve; ids unknown to both cache and store are
    /// silently omitted from the response
    pub ids: Vec<u64>,
}
