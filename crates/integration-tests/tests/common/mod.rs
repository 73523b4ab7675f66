//! Shared helpers for the HTTP-level test suite.
//!
//! These tests require:
//! - A running `PostgreSQL` database
//! - The API server running (cargo run -p saltbox-api)
//!
//! Run with: cargo test -p saltbox-integration-tests -- --ignored

// Each test binary compiles this module separately and uses its own subset
// of the helpers.
#![allow(dead_code)]

use reqwest::Client;
use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL for the API (configurable via environment).
pub fn base_url() -> String {
    std::env::var("SALTBOX_BASE_URL").unwrap_or_else(|_| "http://localhost:5000".to_string())
}

/// A fresh session identifier so tests never share carts.
pub fn fresh_session() -> String {
    format!("test-session-{}", Uuid::new_v4())
}

/// Register a throwaway admin and return a bearer token for catalog
/// mutations. Registration with `role: "admin"` is open by design.
pub async fn admin_token(client: &Client) -> String {
    let resp = client
        .post(format!("{}/auth/register", base_url()))
        .json(&json!({
            "name": "Test Admin",
            "email": format!("admin-{}@test.example", Uuid::new_v4()),
            "password": "correct-horse",
            "role": "admin",
        }))
        .send()
        .await
        .expect("failed to register admin");

    assert_eq!(resp.status(), 201, "admin registration failed");
    let body: Value = resp.json().await.expect("invalid registration body");
    body["token"]
        .as_str()
        .expect("registration response missing token")
        .to_string()
}

/// Create a product via the admin API and return its JSON representation.
pub async fn create_product(
    client: &Client,
    token: &str,
    name: &str,
    price: &str,
    stock: i64,
) -> Value {
    let resp = client
        .post(format!("{}/products", base_url()))
        .bearer_auth(token)
        .json(&json!({
            "name": name,
            "description": "integration test product",
            "price": price,
            "stock": stock,
            "category": "test",
        }))
        .send()
        .await
        .expect("failed to create product");

    assert_eq!(resp.status(), 201, "product creation failed");
    resp.json().await.expect("invalid product body")
}

/// Add a product to a session's cart, asserting success.
pub async fn add_to_cart(client: &Client, session: &str, product_id: &str, quantity: i64) -> Value {
    let resp = client
        .post(format!("{}/cart/{session}/items", base_url()))
        .json(&json!({ "productId": product_id, "quantity": quantity }))
        .send()
        .await
        .expect("failed to add to cart");

    assert_eq!(resp.status(), 200, "add to cart failed");
    resp.json().await.expect("invalid cart body")
}

/// Run the checkout transition for a session.
pub async fn checkout(client: &Client, session: &str) -> reqwest::Response {
    client
        .post(format!("{}/orders", base_url()))
        .json(&json!({
            "customerName": "Test Customer",
            "customerEmail": "customer@test.example",
            "sessionId": session,
        }))
        .send()
        .await
        .expect("failed to post checkout")
}

/// Fetch a product by ID.
pub async fn get_product(client: &Client, product_id: &str) -> Value {
    let resp = client
        .get(format!("{}/products/{product_id}", base_url()))
        .send()
        .await
        .expect("failed to fetch product");

    assert_eq!(resp.status(), 200, "product fetch failed");
    resp.json().await.expect("invalid product body")
}

/// Parse a decimal JSON value that may arrive as a string or a number.
pub fn decimal(value: &Value) -> rust_decimal::Decimal {
    match value {
        Value::String(s) => s.parse().expect("invalid decimal string"),
        Value::Number(n) => n.to_string().parse().expect("invalid decimal number"),
        other => panic!("expected decimal, got {other:?}"),
    }
}
