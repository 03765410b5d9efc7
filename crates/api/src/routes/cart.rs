//! Cart route handlers. Every endpoint requires an authenticated user and
//! operates on that user's own cart.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use serde_json::{Value, json};

use knavetone_core::ProductId;

use crate::error::Result;
use crate::middleware::RequireUser;
use crate::models::CartItem;
use crate::services::CartService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineRequest {
    pub product_id: ProductId,
    pub quantity: i32,
}

/// `GET /api/cart` - The caller's cart joined with live product data.
pub async fn show(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Vec<CartItem>>> {
    let items = CartService::new(state.pool()).items(user.id).await?;
    Ok(Json(items))
}

/// `POST /api/cart` - Set a line to an absolute quantity.
///
/// The quantity is not additive: posting `{productId: 1, quantity: 3}` twice
/// leaves the line at 3. Stock moves by the difference, inside one
/// transaction. Quantity 0 removes the line.
pub async fn upsert(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(payload): Json<CartLineRequest>,
) -> Result<Json<Value>> {
    CartService::new(state.pool())
        .set_quantity(user.id, payload.product_id, payload.quantity)
        .await?;

    Ok(Json(json!({ "message": "Cart updated successfully." })))
}

/// `DELETE /api/cart/{productId}` - Remove a line, returning its units to
/// stock.
pub async fn remove(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(product_id): Path<ProductId>,
) -> Result<Json<Value>> {
    CartService::new(state.pool())
        .remove_line(user.id, product_id)
        .await?;

    Ok(Json(json!({ "message": "Item removed from cart." })))
}
