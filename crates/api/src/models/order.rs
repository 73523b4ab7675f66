//! Order domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use saltbox_core::{Email, OrderId, OrderItemId, OrderStatus, ProductId};

/// A placed order.
///
/// Item snapshots and totals are immutable after creation; only `status`
/// may change, and only among the values of [`OrderStatus`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// Generated human-readable order number, unique across all orders.
    pub order_number: String,
    /// Customer name as entered at checkout.
    pub customer_name: String,
    /// Normalized customer email.
    pub customer_email: Email,
    /// Frozen line-item snapshots.
    pub items: Vec<OrderItem>,
    /// The cart total at checkout time.
    pub subtotal: Decimal,
    /// Fixed-rate tax on the subtotal.
    pub tax: Decimal,
    /// `subtotal + tax`.
    pub total: Decimal,
    /// Current lifecycle status.
    pub status: OrderStatus,
    /// The session whose cart produced this order.
    pub session_id: String,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
    /// When the order was last updated (status changes only).
    pub updated_at: DateTime<Utc>,
}

/// The computed, not-yet-persisted outcome of the checkout transition.
///
/// Built by [`crate::services::checkout`] from a resolved cart, then
/// persisted atomically by the order repository.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub customer_name: String,
    pub customer_email: Email,
    pub session_id: String,
    pub items: Vec<OrderItemDraft>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

/// A frozen line awaiting persistence.
#[derive(Debug, Clone)]
pub struct OrderItemDraft {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i32,
    pub price: Decimal,
    pub subtotal: Decimal,
}

/// A frozen order line.
///
/// Name and unit price are copied from the catalog and the cart at checkout
/// time so the order stays accurate if the product record later changes or
/// disappears.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Snapshot row ID.
    pub id: OrderItemId,
    /// The product this line was purchased from, by identity only.
    pub product_id: ProductId,
    /// Product name at checkout time.
    pub product_name: String,
    /// Units purchased.
    pub quantity: i32,
    /// Unit price captured on the cart line (not necessarily the live
    /// catalog price at checkout time).
    pub price: Decimal,
    /// `price × quantity`.
    pub subtotal: Decimal,
}
