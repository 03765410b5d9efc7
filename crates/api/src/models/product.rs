//! Catalog product model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use knavetone_core::ProductId;

/// A sellable item in the catalog.
///
/// `stock` is the number of units still available for reservation. Cart
/// operations decrement it at add-to-cart time; it must never go negative.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub brand: String,
    /// Product category (Electric, Acoustic, Bass, Drums, Effects, ...).
    /// Kept as a free string, matching the catalog admin form.
    #[serde(rename = "type")]
    pub category: String,
    pub price: Decimal,
    pub stock: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_category_serializes_as_type() {
        let product = Product {
            id: ProductId::new(1),
            name: "Stratocaster".to_string(),
            brand: "Fender".to_string(),
            category: "Electric".to_string(),
            price: Decimal::new(129_999, 2),
            stock: 5,
            image: None,
            description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["type"], "Electric");
        assert_eq!(json["stock"], 5);
        assert_eq!(json["price"], "1299.99");
    }
}
