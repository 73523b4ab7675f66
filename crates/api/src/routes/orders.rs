//! Order route handlers, including the checkout transition.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use saltbox_core::{Email, OrderId, OrderStatus};

use crate::db::{CartRepository, OrderRepository};
use crate::error::{ApiError, Result};
use crate::models::Order;
use crate::routes::ApiJson;
use crate::services::checkout::{self, CheckoutError};
use crate::state::AppState;

/// Checkout request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub session_id: Option<String>,
}

/// Status update request body.
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: Option<String>,
}

/// Run the checkout transition: cart → order, stock decrement, cart clear.
///
/// The computation happens in [`checkout::build_draft`]; persistence is one
/// atomic transaction in the order repository, so a failure anywhere leaves
/// cart, order, and stock state untouched.
#[instrument(skip(state, request))]
pub async fn create(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CheckoutRequest>,
) -> Result<impl IntoResponse> {
    let (Some(customer_name), Some(customer_email), Some(session_id)) = (
        non_empty(request.customer_name),
        non_empty(request.customer_email),
        non_empty(request.session_id),
    ) else {
        return Err(ApiError::Validation(
            "customer name, email, and session ID are required".into(),
        ));
    };

    let email = Email::parse(&customer_email)
        .map_err(|e| ApiError::Validation(format!("invalid customer email: {e}")))?;

    let cart = CartRepository::new(state.pool())
        .fetch(&session_id)
        .await?
        .ok_or(ApiError::Checkout(CheckoutError::EmptyCart))?;

    let draft = checkout::build_draft(&customer_name, email, &cart)?;

    let order = OrderRepository::new(state.pool()).place(&draft).await?;

    tracing::info!(
        order_id = %order.id,
        order_number = %order.order_number,
        total = %order.total,
        "order placed"
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "order created successfully",
            "order": order,
        })),
    ))
}

/// List all orders, newest first.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool()).list().await?;
    Ok(Json(orders))
}

/// Get a single order.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    OrderRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("order not found".into()))
}

/// List orders for a customer email, newest first.
#[instrument(skip(state))]
pub async fn by_customer(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool())
        .list_by_customer_email(&email)
        .await?;

    Ok(Json(orders))
}

/// Set an order's status.
///
/// The value must come from the closed status set, but transitions are
/// otherwise unrestricted and re-setting the current status succeeds.
#[instrument(skip(state, request))]
pub async fn set_status(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    ApiJson(request): ApiJson<SetStatusRequest>,
) -> Result<Json<Order>> {
    let status: OrderStatus = request
        .status
        .as_deref()
        .unwrap_or("")
        .parse()
        .map_err(|_| ApiError::Validation("invalid status".into()))?;

    OrderRepository::new(state.pool())
        .set_status(id, status)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("order not found".into()))
}

/// Trim a text field, treating blank input as absent.
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}
