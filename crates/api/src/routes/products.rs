//! Catalog route handlers. Reads are public; writes are admin-only.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};

use knavetone_core::ProductId;

use crate::db::products;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::Product;
use crate::state::AppState;

/// Create/update payload. `type` on the wire is the catalog category
/// (Electric, Acoustic, Bass, Amplifier, Accessory).
#[derive(Debug, Deserialize)]
pub struct ProductPayload {
    pub name: String,
    pub brand: String,
    #[serde(rename = "type")]
    pub category: String,
    pub price: Decimal,
    pub stock: i32,
    pub image: Option<String>,
    pub description: Option<String>,
}

impl ProductPayload {
    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::BadRequest("Product name is required.".to_string()));
        }
        if self.brand.trim().is_empty() {
            return Err(AppError::BadRequest("Product brand is required.".to_string()));
        }
        if self.category.trim().is_empty() {
            return Err(AppError::BadRequest("Product type is required.".to_string()));
        }
        if self.price < Decimal::ZERO {
            return Err(AppError::BadRequest("Price cannot be negative.".to_string()));
        }
        if self.stock < 0 {
            return Err(AppError::BadRequest("Stock cannot be negative.".to_string()));
        }
        Ok(())
    }

    fn as_new_product(&self) -> products::NewProduct<'_> {
        products::NewProduct {
            name: self.name.trim(),
            brand: self.brand.trim(),
            category: self.category.trim(),
            price: self.price,
            stock: self.stock,
            image: self.image.as_deref(),
            description: self.description.as_deref(),
        }
    }
}

/// `GET /api/products` - The full catalog, newest first.
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = products::list(state.pool()).await?;
    Ok(Json(products))
}

/// `GET /api/products/{id}` - One product.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    let product = products::get(state.pool(), id)
        .await?
        .ok_or(AppError::NotFound("Product not found.".to_string()))?;

    Ok(Json(product))
}

/// `POST /api/products` - Add a product to the catalog (admin).
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(payload): Json<ProductPayload>,
) -> Result<(StatusCode, Json<Product>)> {
    payload.validate()?;

    let product = products::create(state.pool(), payload.as_new_product()).await?;

    tracing::info!(admin_id = %admin.id, product_id = %product.id, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// `PUT /api/products/{id}` - Replace a product's fields (admin).
///
/// Setting `stock` here is an absolute overwrite; it does not reconcile
/// against outstanding cart reservations.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
    Json(payload): Json<ProductPayload>,
) -> Result<Json<Product>> {
    payload.validate()?;

    let product = products::update(state.pool(), id, payload.as_new_product()).await?;

    tracing::info!(admin_id = %admin.id, product_id = %product.id, "Product updated");
    Ok(Json(product))
}

/// `DELETE /api/products/{id}` - Remove a product (admin).
///
/// Cart lines pointing at it are left dangling; the cart read path filters
/// them out via its join.
pub async fn remove(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Result<Json<Value>> {
    if !products::delete(state.pool(), id).await? {
        return Err(AppError::NotFound("Product not found.".to_string()));
    }

    tracing::info!(admin_id = %admin.id, product_id = %id, "Product deleted");
    Ok(Json(json!({ "message": "Product deleted successfully." })))
}
