//! Cart repository for session-cart database operations.
//!
//! Every mutation recomputes the cart's stored total inside the same
//! transaction, preserving the invariant `total == Σ(price × quantity)`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use saltbox_core::{CartItemId, ProductId};

use super::RepositoryError;
use crate::models::{Cart, CartItem, ProductSummary};

/// Internal row type for the cart header.
#[derive(Debug, sqlx::FromRow)]
struct CartRow {
    session_id: String,
    total: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Internal row type for cart lines joined against the live catalog.
#[derive(Debug, sqlx::FromRow)]
struct CartItemRow {
    id: Uuid,
    product_id: Uuid,
    quantity: i32,
    price: Decimal,
    product_name: Option<String>,
    product_price: Option<Decimal>,
    product_category: Option<String>,
    product_image_url: Option<String>,
}

impl From<CartItemRow> for CartItem {
    fn from(row: CartItemRow) -> Self {
        let product_id = ProductId::new(row.product_id);
        // The join against products comes back all-null when the product has
        // been deleted from the catalog; the line then resolves to no product.
        let product = match (row.product_name, row.product_price, row.product_category) {
            (Some(name), Some(price), Some(category)) => Some(ProductSummary {
                id: product_id,
                name,
                price,
                category,
                image_url: row.product_image_url,
            }),
            _ => None,
        };

        Self {
            id: CartItemId::new(row.id),
            product_id,
            quantity: row.quantity,
            price: row.price,
            product,
        }
    }
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Fetch a cart with its items resolved, or `None` if no cart exists
    /// for the session.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn fetch(&self, session_id: &str) -> Result<Option<Cart>, RepositoryError> {
        let header = sqlx::query_as::<_, CartRow>(
            "SELECT session_id, total, created_at, updated_at FROM carts WHERE session_id = $1",
        )
        .bind(session_id)
        .fetch_optional(self.pool)
        .await?;

        let Some(header) = header else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, CartItemRow>(
            r"
            SELECT ci.id, ci.product_id, ci.quantity, ci.price,
                   p.name AS product_name,
                   p.price AS product_price,
                   p.category AS product_category,
                   p.image_url AS product_image_url
            FROM cart_items ci
            LEFT JOIN products p ON p.id = ci.product_id
            WHERE ci.session_id = $1
            ORDER BY ci.created_at
            ",
        )
        .bind(session_id)
        .fetch_all(self.pool)
        .await?;

        Ok(Some(Cart {
            session_id: header.session_id,
            items: items.into_iter().map(CartItem::from).collect(),
            total: header.total,
            created_at: header.created_at,
            updated_at: header.updated_at,
        }))
    }

    /// Fetch the cart for a session, creating and persisting an empty one
    /// if absent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_or_create(&self, session_id: &str) -> Result<Cart, RepositoryError> {
        self.ensure_exists(session_id).await?;
        self.fetch(session_id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Add units of a product to the cart, creating the cart if needed.
    ///
    /// If a line for the product already exists, the quantity accumulates
    /// onto it and the line keeps its originally captured unit price;
    /// otherwise a new line is created at `unit_price`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn add_item(
        &self,
        session_id: &str,
        product_id: ProductId,
        quantity: i32,
        unit_price: Decimal,
    ) -> Result<(), RepositoryError> {
        self.ensure_exists(session_id).await?;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"
            INSERT INTO cart_items (id, session_id, product_id, quantity, price)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (session_id, product_id)
            DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity
            ",
        )
        .bind(CartItemId::generate().as_uuid())
        .bind(session_id)
        .bind(product_id.as_uuid())
        .bind(quantity)
        .bind(unit_price)
        .execute(&mut *tx)
        .await?;

        recompute_total(&mut tx, session_id).await?;
        tx.commit().await?;

        Ok(())
    }

    /// Set a line's quantity directly; a quantity of zero or less removes
    /// the line entirely.
    ///
    /// Returns `RepositoryError::NotFound` if the line is not in this
    /// session's cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn set_item_quantity(
        &self,
        session_id: &str,
        item_id: CartItemId,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let result = if quantity <= 0 {
            sqlx::query("DELETE FROM cart_items WHERE id = $1 AND session_id = $2")
                .bind(item_id.as_uuid())
                .bind(session_id)
                .execute(&mut *tx)
                .await?
        } else {
            sqlx::query("UPDATE cart_items SET quantity = $3 WHERE id = $1 AND session_id = $2")
                .bind(item_id.as_uuid())
                .bind(session_id)
                .bind(quantity)
                .execute(&mut *tx)
                .await?
        };

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        recompute_total(&mut tx, session_id).await?;
        tx.commit().await?;

        Ok(())
    }

    /// Remove a line from the cart.
    ///
    /// Returns `RepositoryError::NotFound` if the line is not in this
    /// session's cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn remove_item(
        &self,
        session_id: &str,
        item_id: CartItemId,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM cart_items WHERE id = $1 AND session_id = $2")
            .bind(item_id.as_uuid())
            .bind(session_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        recompute_total(&mut tx, session_id).await?;
        tx.commit().await?;

        Ok(())
    }

    /// Empty the cart: delete all lines and zero the total. The cart row
    /// itself survives.
    ///
    /// Returns `RepositoryError::NotFound` if no cart exists for the session.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn clear(&self, session_id: &str) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE carts SET total = 0, updated_at = now() WHERE session_id = $1",
        )
        .bind(session_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        sqlx::query("DELETE FROM cart_items WHERE session_id = $1")
            .bind(session_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Insert the cart row if it does not exist yet.
    async fn ensure_exists(&self, session_id: &str) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO carts (session_id) VALUES ($1) ON CONFLICT (session_id) DO NOTHING")
            .bind(session_id)
            .execute(self.pool)
            .await?;

        Ok(())
    }
}

/// Recompute the stored cart total from its lines.
async fn recompute_total(
    tx: &mut Transaction<'_, Postgres>,
    session_id: &str,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        UPDATE carts
        SET total = COALESCE(
                (SELECT SUM(price * quantity) FROM cart_items WHERE session_id = $1), 0),
            updated_at = now()
        WHERE session_id = $1
        ",
    )
    .bind(session_id)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
