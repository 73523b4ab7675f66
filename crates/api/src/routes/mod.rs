//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                              - Liveness + datastore connectivity
//!
//! # Auth
//! POST /auth/register                       - Register, returns bearer token
//! POST /auth/login                          - Login, returns bearer token
//!
//! # Products
//! GET    /products                          - Catalog listing (?category=, ?search=)
//! GET    /products/{id}                     - Product detail
//! POST   /products                          - Create (admin, optional image upload)
//! PUT    /products/{id}                     - Update (admin, optional image upload)
//! DELETE /products/{id}                     - Delete (admin)
//!
//! # Cart
//! GET    /cart/{session_id}                 - Get-or-create cart
//! POST   /cart/{session_id}/items           - Add item {productId, quantity}
//! PUT    /cart/{session_id}/items/{item_id} - Set quantity (≤0 removes)
//! DELETE /cart/{session_id}/items/{item_id} - Remove item
//! DELETE /cart/{session_id}                 - Clear cart
//!
//! # Orders
//! POST /orders                              - Checkout transition
//! GET  /orders                              - All orders, newest first
//! GET  /orders/{id}                         - Order detail
//! GET  /orders/customer/{email}             - Orders by customer email
//! PUT  /orders/{id}/status                  - Set status
//!
//! # Static
//! GET  /uploads/{file}                      - Uploaded product images
//! ```

pub mod auth;
pub mod cart;
pub mod orders;
pub mod products;

use axum::{
    Json, Router,
    extract::{FromRequest, Request},
    routing::{get, post, put},
};

use crate::error::ApiError;
use crate::state::AppState;

/// JSON body extractor that reports rejections through the API error
/// taxonomy, so malformed bodies get a 400 with a JSON message like every
/// other error instead of axum's plain-text rejection.
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: serde::de::DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::Validation(e.to_string()))?;

        Ok(Self(value))
    }
}

/// Create the auth routes router.
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
}

/// Create the product catalog router.
fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::destroy),
        )
}

/// Create the cart router.
fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/{session_id}", get(cart::show).delete(cart::clear))
        .route("/{session_id}/items", post(cart::add_item))
        .route(
            "/{session_id}/items/{item_id}",
            put(cart::update_item).delete(cart::remove_item),
        )
}

/// Create the orders router.
fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index).post(orders::create))
        .route("/customer/{email}", get(orders::by_customer))
        .route("/{id}", get(orders::show))
        .route("/{id}/status", put(orders::set_status))
}

/// Create the complete application router (state applied in `main`).
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .nest("/orders", order_routes())
}
