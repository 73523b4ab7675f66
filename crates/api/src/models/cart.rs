//! Cart domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use saltbox_core::{CartItemId, ProductId};

use super::ProductSummary;

/// A session cart with its line items resolved against the live catalog.
///
/// The stored `total` always equals `Σ(item.price × item.quantity)`; it is
/// recomputed inside the same transaction as every mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// The owning session identifier (one cart per session).
    pub session_id: String,
    /// Line items, oldest first.
    pub items: Vec<CartItem>,
    /// Maintained sum of line subtotals.
    pub total: Decimal,
    /// When the cart was created.
    pub created_at: DateTime<Utc>,
    /// When the cart was last mutated.
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// Whether the cart holds no line items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A cart line item.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Line identifier, addressable by the update/remove routes.
    pub id: CartItemId,
    /// The referenced product.
    pub product_id: ProductId,
    /// Units requested. Always ≥ 1.
    pub quantity: i32,
    /// Unit price captured when the line was first added. Deliberately NOT
    /// refreshed when more units accumulate on the line or when the catalog
    /// price changes.
    pub price: Decimal,
    /// Live product details, or `None` if the product has since been
    /// deleted from the catalog.
    pub product: Option<ProductSummary>,
}

impl CartItem {
    /// The line's contribution to the cart total.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: i32, price: Decimal) -> CartItem {
        CartItem {
            id: CartItemId::generate(),
            product_id: ProductId::generate(),
            quantity,
            price,
            product: None,
        }
    }

    #[test]
    fn test_line_subtotal() {
        let line = item(3, Decimal::new(1050, 2)); // 3 × 10.50
        assert_eq!(line.subtotal(), Decimal::new(3150, 2));
    }

    #[test]
    fn test_total_matches_sum_of_line_subtotals() {
        let items = vec![
            item(2, Decimal::new(1000, 2)), // 2 × 10.00
            item(1, Decimal::new(500, 2)),  // 1 × 5.00
        ];
        let total: Decimal = items.iter().map(CartItem::subtotal).sum();
        assert_eq!(total, Decimal::new(2500, 2));
    }
}
