//! Product repository for catalog database operations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use saltbox_core::ProductId;

use super::RepositoryError;
use crate::models::Product;

/// Upper bound on catalog reads. A read that exceeds this ceiling fails with
/// [`RepositoryError::Timeout`] and surfaces to clients as 503.
pub const CATALOG_READ_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Filters for the catalog listing.
#[derive(Debug, Default)]
pub struct ProductFilter {
    /// Exact category match.
    pub category: Option<String>,
    /// Case-insensitive substring match against name or description.
    pub search: Option<String>,
}

/// Fields for creating a product.
#[derive(Debug)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: i32,
    pub category: String,
    pub image_url: Option<String>,
}

/// Partial update for a product. `None` fields keep their current value.
#[derive(Debug, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

/// Internal row type for product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    description: String,
    price: Decimal,
    stock: i32,
    category: String,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            name: row.name,
            description: row.description,
            price: row.price,
            stock: row.stock,
            category: row.category,
            image_url: row.image_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products, newest first, with optional category/search filters.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Timeout` if the read exceeds
    /// [`CATALOG_READ_TIMEOUT`], `RepositoryError::Database` on query failure.
    pub async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        let query = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, description, price, stock, category, image_url,
                   created_at, updated_at
            FROM products
            WHERE ($1::text IS NULL OR category = $1)
              AND ($2::text IS NULL
                   OR name ILIKE '%' || $2 || '%'
                   OR description ILIKE '%' || $2 || '%')
            ORDER BY created_at DESC
            ",
        )
        .bind(filter.category.as_deref())
        .bind(filter.search.as_deref())
        .fetch_all(self.pool);

        let rows = with_read_ceiling(query).await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Timeout` if the read exceeds
    /// [`CATALOG_READ_TIMEOUT`], `RepositoryError::Database` on query failure.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let query = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, description, price, stock, category, image_url,
                   created_at, updated_at
            FROM products
            WHERE id = $1
            ",
        )
        .bind(id.as_uuid())
        .fetch_optional(self.pool);

        let row = with_read_ceiling(query).await?;
        Ok(row.map(Product::from))
    }

    /// Create a new product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, input: &NewProduct) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            INSERT INTO products (id, name, description, price, stock, category, image_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, name, description, price, stock, category, image_url,
                      created_at, updated_at
            ",
        )
        .bind(ProductId::generate().as_uuid())
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.stock)
        .bind(&input.category)
        .bind(input.image_url.as_deref())
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Apply a partial update to a product.
    ///
    /// Returns `None` if the product does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update(
        &self,
        id: ProductId,
        patch: &ProductPatch,
    ) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            UPDATE products
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                stock = COALESCE($5, stock),
                category = COALESCE($6, category),
                image_url = COALESCE($7, image_url),
                updated_at = now()
            WHERE id = $1
            RETURNING id, name, description, price, stock, category, image_url,
                      created_at, updated_at
            ",
        )
        .bind(id.as_uuid())
        .bind(patch.name.as_deref())
        .bind(patch.description.as_deref())
        .bind(patch.price)
        .bind(patch.stock)
        .bind(patch.category.as_deref())
        .bind(patch.image_url.as_deref())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    /// Delete a product. Returns `true` if a row was removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Run a catalog read under the fixed time ceiling.
async fn with_read_ceiling<T>(
    query: impl Future<Output = Result<T, sqlx::Error>>,
) -> Result<T, RepositoryError> {
    match tokio::time::timeout(CATALOG_READ_TIMEOUT, query).await {
        Ok(result) => Ok(result?),
        Err(_elapsed) => Err(RepositoryError::Timeout),
    }
}
