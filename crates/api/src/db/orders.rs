//! Order repository: the persistence half of the checkout transition, plus
//! order reads and status updates.

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use saltbox_core::{Email, OrderId, OrderItemId, OrderStatus, ProductId};

use super::RepositoryError;
use crate::models::order::{Order, OrderDraft, OrderItem};

/// How many times to regenerate a colliding order number before giving up.
const MAX_ORDER_NUMBER_ATTEMPTS: u32 = 3;

/// Internal row type for order headers.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    order_number: String,
    customer_name: String,
    customer_email: String,
    subtotal: Decimal,
    tax: Decimal,
    total: Decimal,
    status: String,
    session_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Internal row type for order line snapshots.
#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: Uuid,
    order_id: Uuid,
    product_id: Uuid,
    product_name: String,
    quantity: i32,
    price: Decimal,
    subtotal: Decimal,
}

impl OrderItemRow {
    fn into_item(self) -> OrderItem {
        OrderItem {
            id: OrderItemId::new(self.id),
            product_id: ProductId::new(self.product_id),
            product_name: self.product_name,
            quantity: self.quantity,
            price: self.price,
            subtotal: self.subtotal,
        }
    }
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Result<Order, RepositoryError> {
        let customer_email = Email::parse(&self.customer_email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let status: OrderStatus = self.status.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid order status in database: {e}"))
        })?;

        Ok(Order {
            id: OrderId::new(self.id),
            order_number: self.order_number,
            customer_name: self.customer_name,
            customer_email,
            items,
            subtotal: self.subtotal,
            tax: self.tax,
            total: self.total,
            status,
            session_id: self.session_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist the checkout transition atomically.
    ///
    /// One transaction covers the order insert, the line snapshots, the
    /// clamped stock decrements, and the cart clear: either the whole
    /// transition commits or none of it does. The clamped decrement
    /// (`stock = GREATEST(stock - qty, 0)`) is a single atomic update per
    /// product, so concurrent checkouts against a shared product cannot
    /// drive stock negative or lose an update.
    ///
    /// Order numbers combine a timestamp with a random component and are
    /// only probabilistically unique, so the UNIQUE constraint backs them
    /// up: on a collision the whole transaction is retried with a fresh
    /// number, up to [`MAX_ORDER_NUMBER_ATTEMPTS`] times.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a unique order number could
    /// not be generated, `RepositoryError::Database` on other failures.
    pub async fn place(&self, draft: &OrderDraft) -> Result<Order, RepositoryError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.try_place(draft).await {
                Err(RepositoryError::Conflict(reason)) => {
                    if attempt >= MAX_ORDER_NUMBER_ATTEMPTS {
                        return Err(RepositoryError::Conflict(reason));
                    }
                    tracing::warn!(attempt, "order number collision, retrying");
                }
                other => return other,
            }
        }
    }

    async fn try_place(&self, draft: &OrderDraft) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let order_id = OrderId::generate();
        let order_number = generate_order_number();

        let header = sqlx::query_as::<_, OrderRow>(
            r"
            INSERT INTO orders (id, order_number, customer_name, customer_email,
                                subtotal, tax, total, status, session_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending', $8)
            RETURNING id, order_number, customer_name, customer_email,
                      subtotal, tax, total, status, session_id,
                      created_at, updated_at
            ",
        )
        .bind(order_id.as_uuid())
        .bind(&order_number)
        .bind(&draft.customer_name)
        .bind(draft.customer_email.as_str())
        .bind(draft.subtotal)
        .bind(draft.tax)
        .bind(draft.total)
        .bind(&draft.session_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict(format!(
                    "order number already exists: {order_number}"
                ));
            }
            RepositoryError::Database(e)
        })?;

        let mut items = Vec::with_capacity(draft.items.len());
        for line in &draft.items {
            let row = sqlx::query_as::<_, OrderItemRow>(
                r"
                INSERT INTO order_items (id, order_id, product_id, product_name,
                                         quantity, price, subtotal)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id, order_id, product_id, product_name, quantity, price, subtotal
                ",
            )
            .bind(OrderItemId::generate().as_uuid())
            .bind(order_id.as_uuid())
            .bind(line.product_id.as_uuid())
            .bind(&line.product_name)
            .bind(line.quantity)
            .bind(line.price)
            .bind(line.subtotal)
            .fetch_one(&mut *tx)
            .await?;

            items.push(row.into_item());

            decrement_stock(&mut tx, line.product_id, line.quantity).await?;
        }

        clear_cart(&mut tx, &draft.session_id).await?;

        tx.commit().await?;

        header.into_order(items)
    }

    /// List all orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, order_number, customer_name, customer_email,
                   subtotal, tax, total, status, session_id, created_at, updated_at
            FROM orders
            ORDER BY created_at DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        self.attach_items(rows).await
    }

    /// List orders for a customer email, newest first. The email is
    /// lowercased to match the normalized stored form.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_by_customer_email(&self, email: &str) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, order_number, customer_name, customer_email,
                   subtotal, tax, total, status, session_id, created_at, updated_at
            FROM orders
            WHERE customer_email = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(email.to_lowercase())
        .fetch_all(self.pool)
        .await?;

        self.attach_items(rows).await
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, order_number, customer_name, customer_email,
                   subtotal, tax, total, status, session_id, created_at, updated_at
            FROM orders
            WHERE id = $1
            ",
        )
        .bind(id.as_uuid())
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = self.items_for(id).await?;
        Ok(Some(row.into_order(items)?))
    }

    /// Set an order's status. Any status may replace any other; setting the
    /// current status again is a successful no-op.
    ///
    /// Returns `None` if the order does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn set_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            UPDATE orders
            SET status = $2, updated_at = now()
            WHERE id = $1
            RETURNING id, order_number, customer_name, customer_email,
                      subtotal, tax, total, status, session_id, created_at, updated_at
            ",
        )
        .bind(id.as_uuid())
        .bind(status.to_string())
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = self.items_for(id).await?;
        Ok(Some(row.into_order(items)?))
    }

    async fn items_for(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderItemRow>(
            r"
            SELECT id, order_id, product_id, product_name, quantity, price, subtotal
            FROM order_items
            WHERE order_id = $1
            ORDER BY created_at
            ",
        )
        .bind(order_id.as_uuid())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(OrderItemRow::into_item).collect())
    }

    /// Fetch line snapshots for a batch of orders in one query.
    async fn attach_items(&self, rows: Vec<OrderRow>) -> Result<Vec<Order>, RepositoryError> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

        let item_rows = sqlx::query_as::<_, OrderItemRow>(
            r"
            SELECT id, order_id, product_id, product_name, quantity, price, subtotal
            FROM order_items
            WHERE order_id = ANY($1)
            ORDER BY created_at
            ",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut by_order: std::collections::HashMap<Uuid, Vec<OrderItem>> =
            std::collections::HashMap::new();
        for item in item_rows {
            by_order
                .entry(item.order_id)
                .or_default()
                .push(item.into_item());
        }

        rows.into_iter()
            .map(|row| {
                let items = by_order.remove(&row.id).unwrap_or_default();
                row.into_order(items)
            })
            .collect()
    }
}

/// Atomically decrement a product's stock, clamping at zero.
async fn decrement_stock(
    tx: &mut Transaction<'_, Postgres>,
    product_id: ProductId,
    quantity: i32,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        UPDATE products
        SET stock = GREATEST(stock - $2, 0), updated_at = now()
        WHERE id = $1
        ",
    )
    .bind(product_id.as_uuid())
    .bind(quantity)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Empty the session's cart as part of the checkout transaction.
async fn clear_cart(
    tx: &mut Transaction<'_, Postgres>,
    session_id: &str,
) -> Result<(), RepositoryError> {
    sqlx::query("DELETE FROM cart_items WHERE session_id = $1")
        .bind(session_id)
        .execute(&mut **tx)
        .await?;

    sqlx::query("UPDATE carts SET total = 0, updated_at = now() WHERE session_id = $1")
        .bind(session_id)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

/// Generate a human-readable order number from the current timestamp and a
/// random three-digit component.
fn generate_order_number() -> String {
    let millis = Utc::now().timestamp_millis();
    let random: u16 = rand::rng().random_range(0..1000);
    format!("ORD-{millis}-{random:03}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_number_shape() {
        let number = generate_order_number();
        let mut parts = number.split('-');
        assert_eq!(parts.next(), Some("ORD"));

        let millis = parts.next().expect("timestamp part");
        assert!(millis.parse::<i64>().is_ok());

        let random = parts.next().expect("random part");
        assert_eq!(random.len(), 3);
        assert!(random.parse::<u16>().is_ok());

        assert_eq!(parts.next(), None);
    }

    #[test]
    fn test_order_number_varies() {
        let numbers: std::collections::HashSet<String> =
            (0..32).map(|_| generate_order_number()).collect();
        // With a shared timestamp the random suffix still gives distinct
        // values nearly always; allow a handful of collisions.
        assert!(numbers.len() > 24);
    }
}
