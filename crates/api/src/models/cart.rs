//! Joined cart item model.
//!
//! Cart lines themselves never leave the repository layer (reads join them
//! with products, mutations address them by (user, product) key), so the
//! only model here is the joined view.

use rust_decimal::Decimal;
use serde::Serialize;

use knavetone_core::ProductId;

/// A cart line joined with its current product snapshot.
///
/// This is a live join: price and stock reflect the product as it is now,
/// even though the quantity was reserved against stock at an earlier instant.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    pub quantity: i32,
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}
