//! Database operations for the Saltbox `PostgreSQL` store.
//!
//! ## Tables
//!
//! - `users` - Registered users and their password hashes
//! - `auth_tokens` - Opaque bearer tokens with expiry
//! - `products` - Catalog
//! - `carts` / `cart_items` - One cart per session, line items keyed by product
//! - `orders` / `order_items` - Placed orders with frozen line snapshots
//!
//! All queries are runtime-checked (`query`/`query_as` with explicit row
//! structs) so the workspace builds without a live database. Migrations are
//! embedded from `crates/api/migrations/` via `sqlx::migrate!` and run at
//! startup.

pub mod carts;
pub mod orders;
pub mod products;
pub mod tokens;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use carts::CartRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use tokens::TokenRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email or order number).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// A read exceeded its time ceiling.
    #[error("operation timed out")]
    Timeout,
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
