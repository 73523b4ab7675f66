//! Product catalog route handlers.
//!
//! Reads are public; mutations require the catalog-management capability via
//! the bearer-token auth gate. Create and update accept either a JSON body
//! or `multipart/form-data` with an optional `image` file part, which is
//! stored by the upload service and linked on the product.

use axum::{
    Json,
    extract::{FromRequest, Multipart, Path, Query, Request, State},
    http::StatusCode,
    http::header,
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use saltbox_core::ProductId;

use crate::db::ProductRepository;
use crate::db::products::{NewProduct, ProductFilter, ProductPatch};
use crate::error::{ApiError, Result};
use crate::middleware::RequireAdmin;
use crate::models::Product;
use crate::services::upload::{self, ImageUpload};
use crate::state::AppState;

/// Catalog listing query parameters.
#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    /// Exact category match.
    pub category: Option<String>,
    /// Case-insensitive substring match on name or description.
    pub search: Option<String>,
}

/// Create/update payload accepted as JSON or multipart form data.
///
/// Multipart requests carry the text fields alongside an optional `image`
/// file part; JSON requests may instead pass an `imageUrl` directly.
#[derive(Debug, Default)]
pub struct ProductPayload {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub image: Option<ImageUpload>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ProductJson {
    name: Option<String>,
    description: Option<String>,
    price: Option<Decimal>,
    stock: Option<i32>,
    category: Option<String>,
    image_url: Option<String>,
}

impl FromRequest<AppState> for ProductPayload {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| ApiError::Validation(e.to_string()))?;
            Self::from_multipart(multipart).await
        } else {
            let Json(body): Json<ProductJson> = Json::from_request(req, state)
                .await
                .map_err(|e| ApiError::Validation(e.to_string()))?;

            Ok(Self {
                name: body.name,
                description: body.description,
                price: body.price,
                stock: body.stock,
                category: body.category,
                image_url: body.image_url,
                image: None,
            })
        }
    }
}

impl ProductPayload {
    async fn from_multipart(mut multipart: Multipart) -> Result<Self> {
        let mut payload = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::Validation(e.to_string()))?
        {
            let Some(name) = field.name().map(ToOwned::to_owned) else {
                continue;
            };

            match name.as_str() {
                "name" => payload.name = Some(field_text(field).await?),
                "description" => payload.description = Some(field_text(field).await?),
                "category" => payload.category = Some(field_text(field).await?),
                "price" => {
                    let text = field_text(field).await?;
                    let price = text
                        .parse::<Decimal>()
                        .map_err(|_| ApiError::Validation("price must be a number".into()))?;
                    payload.price = Some(price);
                }
                "stock" => {
                    let text = field_text(field).await?;
                    let stock = text
                        .parse::<i32>()
                        .map_err(|_| ApiError::Validation("stock must be an integer".into()))?;
                    payload.stock = Some(stock);
                }
                "image" => {
                    let content_type = field.content_type().unwrap_or_default().to_owned();
                    let file_name = field.file_name().map(ToOwned::to_owned);
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::Validation(e.to_string()))?;

                    payload.image = Some(ImageUpload {
                        file_name,
                        content_type,
                        bytes,
                    });
                }
                // Unknown form fields are ignored
                _ => {}
            }
        }

        Ok(payload)
    }

    /// Store the uploaded image, if any, and return the product's image URL:
    /// the freshly stored file's URL, a pass-through `imageUrl`, or nothing.
    async fn resolve_image(&self, state: &AppState) -> Result<Option<String>> {
        match &self.image {
            Some(image) => Ok(Some(upload::store_image(state.config(), image).await?)),
            None => Ok(self.image_url.clone()),
        }
    }
}

async fn field_text(field: axum::extract::multipart::Field<'_>) -> Result<String> {
    field
        .text()
        .await
        .map_err(|e| ApiError::Validation(e.to_string()))
}

/// List products with optional category/search filters.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<Vec<Product>>> {
    let filter = ProductFilter {
        category: query.category,
        search: query.search,
    };

    let products = ProductRepository::new(state.pool()).list(&filter).await?;

    Ok(Json(products))
}

/// Get a single product.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    ProductRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("product not found".into()))
}

/// Create a product (admin only), optionally storing an uploaded image.
#[instrument(skip(state, payload))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    payload: ProductPayload,
) -> Result<impl IntoResponse> {
    let image_url = payload.resolve_image(&state).await?;

    let name = payload
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("name is required".into()))?;
    let price = payload
        .price
        .ok_or_else(|| ApiError::Validation("price is required".into()))?;
    let category = payload
        .category
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("category is required".into()))?;

    validate_amounts(Some(price), payload.stock)?;

    let product = ProductRepository::new(state.pool())
        .create(&NewProduct {
            name,
            description: payload.description.unwrap_or_default(),
            price,
            stock: payload.stock.unwrap_or(0),
            category,
            image_url,
        })
        .await?;

    tracing::info!(product_id = %product.id, admin = %admin.id, "product created");

    Ok((StatusCode::CREATED, Json(product)))
}

/// Apply a partial update to a product (admin only).
#[instrument(skip(state, payload))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
    payload: ProductPayload,
) -> Result<Json<Product>> {
    let image_url = payload.resolve_image(&state).await?;

    validate_amounts(payload.price, payload.stock)?;

    let product = ProductRepository::new(state.pool())
        .update(
            id,
            &ProductPatch {
                name: payload.name,
                description: payload.description,
                price: payload.price,
                stock: payload.stock,
                category: payload.category,
                image_url,
            },
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("product not found".into()))?;

    tracing::info!(product_id = %product.id, admin = %admin.id, "product updated");

    Ok(Json(product))
}

/// Delete a product (admin only).
#[instrument(skip(state))]
pub async fn destroy(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    let deleted = ProductRepository::new(state.pool()).delete(id).await?;

    if !deleted {
        return Err(ApiError::NotFound("product not found".into()));
    }

    tracing::info!(product_id = %id, admin = %admin.id, "product deleted");

    Ok(Json(json!({ "message": "product deleted successfully" })))
}

/// Shared price/stock sanity checks for create and update.
fn validate_amounts(price: Option<Decimal>, stock: Option<i32>) -> Result<()> {
    if price.is_some_and(|p| p < Decimal::ZERO) {
        return Err(ApiError::Validation("price cannot be negative".into()));
    }
    if stock.is_some_and(|s| s < 0) {
        return Err(ApiError::Validation("stock cannot be negative".into()));
    }
    Ok(())
}
