//! Cart route handlers.
//!
//! Carts are keyed by a caller-chosen session identifier and created lazily
//! on first access. Mutating handlers re-fetch and return the full cart with
//! line items resolved against the live catalog, matching what `GET` returns.
//!
//! Concurrent mutations to the same cart are not serialized: each handler is
//! an independent read-modify-write and the last writer wins per document.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use tracing::instrument;

use saltbox_core::CartItemId;

use crate::db::{CartRepository, ProductRepository, RepositoryError};
use crate::error::{ApiError, Result};
use crate::models::Cart;
use crate::routes::ApiJson;
use crate::state::AppState;

/// Add-item request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub product_id: Option<saltbox_core::ProductId>,
    pub quantity: Option<i32>,
}

/// Update-item request body.
#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: Option<i32>,
}

/// Get the session's cart, creating an empty one if absent.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Cart>> {
    let cart = CartRepository::new(state.pool())
        .get_or_create(&session_id)
        .await?;

    Ok(Json(cart))
}

/// Add units of a product to the cart.
///
/// Requires the product to exist and its live stock to cover the requested
/// quantity. An existing line for the product accumulates quantity while
/// keeping its originally captured unit price; a new line captures the
/// current product price.
#[instrument(skip(state, request))]
pub async fn add_item(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    ApiJson(request): ApiJson<AddItemRequest>,
) -> Result<Json<Cart>> {
    let product_id = request
        .product_id
        .ok_or_else(|| ApiError::Validation("productId is required".into()))?;
    let quantity = request
        .quantity
        .ok_or_else(|| ApiError::Validation("quantity is required".into()))?;
    if quantity < 1 {
        return Err(ApiError::Validation("quantity must be at least 1".into()));
    }

    let product = ProductRepository::new(state.pool())
        .get(product_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("product not found".into()))?;

    if product.stock < quantity {
        return Err(ApiError::OutOfStock);
    }

    let carts = CartRepository::new(state.pool());
    carts
        .add_item(&session_id, product_id, quantity, product.price)
        .await?;

    resolved(&carts, &session_id).await
}

/// Set a line's quantity. Zero or less removes the line entirely; there is
/// no stock re-check at update time.
#[instrument(skip(state, request))]
pub async fn update_item(
    State(state): State<AppState>,
    Path((session_id, item_id)): Path<(String, CartItemId)>,
    ApiJson(request): ApiJson<UpdateItemRequest>,
) -> Result<Json<Cart>> {
    let quantity = request
        .quantity
        .ok_or_else(|| ApiError::Validation("quantity is required".into()))?;

    let carts = CartRepository::new(state.pool());
    require_cart(&carts, &session_id).await?;

    carts
        .set_item_quantity(&session_id, item_id, quantity)
        .await
        .map_err(item_not_found)?;

    resolved(&carts, &session_id).await
}

/// Remove a line from the cart unconditionally.
#[instrument(skip(state))]
pub async fn remove_item(
    State(state): State<AppState>,
    Path((session_id, item_id)): Path<(String, CartItemId)>,
) -> Result<Json<Cart>> {
    let carts = CartRepository::new(state.pool());
    require_cart(&carts, &session_id).await?;

    carts
        .remove_item(&session_id, item_id)
        .await
        .map_err(item_not_found)?;

    resolved(&carts, &session_id).await
}

/// Empty the cart. The cart itself survives with zero items and total.
#[instrument(skip(state))]
pub async fn clear(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Cart>> {
    let carts = CartRepository::new(state.pool());

    carts.clear(&session_id).await.map_err(|e| match e {
        RepositoryError::NotFound => ApiError::NotFound("cart not found".into()),
        other => other.into(),
    })?;

    resolved(&carts, &session_id).await
}

/// Reject requests against sessions that have no cart yet.
async fn require_cart(carts: &CartRepository<'_>, session_id: &str) -> Result<()> {
    carts
        .fetch(session_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| ApiError::NotFound("cart not found".into()))
}

/// Re-fetch the cart after a mutation for the response body.
async fn resolved(carts: &CartRepository<'_>, session_id: &str) -> Result<Json<Cart>> {
    let cart = carts
        .fetch(session_id)
        .await?
        .ok_or_else(|| ApiError::Internal("cart disappeared after mutation".into()))?;

    Ok(Json(cart))
}

fn item_not_found(e: RepositoryError) -> ApiError {
    match e {
        RepositoryError::NotFound => ApiError::NotFound("item not found in cart".into()),
        other => other.into(),
    }
}
