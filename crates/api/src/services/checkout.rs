//! The cart-to-order transition.
//!
//! This module owns the computational half of checkout: given a cart whose
//! lines are resolved against the live catalog, it produces an [`OrderDraft`]
//! with frozen line snapshots and computed totals. The order repository then
//! persists the draft atomically (order insert, stock decrements, cart clear
//! in one transaction).
//!
//! Pricing semantics worth being explicit about:
//!
//! - The subtotal is the cart's *maintained* total, not a recomputation from
//!   live product prices. A line keeps the unit price captured when it was
//!   first added, so the subtotal can drift from what the same items would
//!   cost if re-added at checkout time.
//! - Product *names* in the snapshots are resolved live, because the order
//!   must record what was actually sold even if the cart line predates a
//!   rename.

use rust_decimal::Decimal;
use thiserror::Error;

use saltbox_core::{Email, ProductId};

use crate::models::Cart;
use crate::models::order::{OrderDraft, OrderItemDraft};

/// Fixed tax rate applied to every order's subtotal.
pub const TAX_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2); // 10%

/// Errors that can occur while building the transition.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart does not exist or holds no line items.
    #[error("cart is empty, cannot create order")]
    EmptyCart,

    /// A cart line references a product that has been deleted from the
    /// catalog since it was added.
    #[error("product {0} no longer exists")]
    ProductVanished(ProductId),
}

/// Build the order draft for a resolved cart.
///
/// The draft freezes, per line: the product reference, the product's live
/// name, the quantity, the captured unit price, and the line subtotal.
/// Totals are `subtotal = cart.total`, `tax = subtotal × 10%` (rounded to
/// cents), `total = subtotal + tax`.
///
/// # Errors
///
/// Returns [`CheckoutError::EmptyCart`] if the cart has no lines and
/// [`CheckoutError::ProductVanished`] if a line's product cannot be
/// resolved.
pub fn build_draft(
    customer_name: &str,
    customer_email: Email,
    cart: &Cart,
) -> Result<OrderDraft, CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let mut items = Vec::with_capacity(cart.items.len());
    for line in &cart.items {
        let product = line
            .product
            .as_ref()
            .ok_or(CheckoutError::ProductVanished(line.product_id))?;

        items.push(OrderItemDraft {
            product_id: line.product_id,
            product_name: product.name.clone(),
            quantity: line.quantity,
            price: line.price,
            subtotal: line.subtotal(),
        });
    }

    let subtotal = cart.total;
    let tax = (subtotal * TAX_RATE).round_dp(2);
    let total = subtotal + tax;

    Ok(OrderDraft {
        customer_name: customer_name.to_owned(),
        customer_email,
        session_id: cart.session_id.clone(),
        items,
        subtotal,
        tax,
        total,
    })
}
