//! Product domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use saltbox_core::ProductId;

/// A catalog product.
///
/// Stock is mutated in exactly two places: the checkout transition
/// (clamped decrement) and administrative updates (set directly).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Unit price. Non-negative.
    pub price: Decimal,
    /// Units on hand. Never negative.
    pub stock: i32,
    /// Category label used for exact-match filtering.
    pub category: String,
    /// Public URL of the product image, if one was uploaded.
    pub image_url: Option<String>,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

/// The slice of a product embedded in resolved cart responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    /// The product's live price, which may differ from the price captured
    /// on a cart line.
    pub price: Decimal,
    pub category: String,
    pub image_url: Option<String>,
}
