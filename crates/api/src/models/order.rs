//! Order and order line models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use knavetone_core::{OrderId, OrderLineId, OrderStatus, ProductId, UserId};

/// An immutable snapshot of a cart line captured at order time.
///
/// Name, price, and image are copied from the product when the order is
/// placed; later catalog edits never alter them.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub id: OrderLineId,
    #[serde(skip)]
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub quantity: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// A placed order.
///
/// `total_amount` is computed once at creation (sum of line price x quantity)
/// and never recomputed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub lines: Vec<OrderLine>,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_lng: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Sum of `price * quantity` over a set of snapshot lines.
    #[must_use]
    pub fn compute_total(lines: &[OrderLine]) -> Decimal {
        lines
            .iter()
            .map(|line| line.price * Decimal::from(line.quantity))
            .sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(price: &str, quantity: i32) -> OrderLine {
        OrderLine {
            id: OrderLineId::new(0),
            order_id: OrderId::new(0),
            product_id: ProductId::new(1),
            name: "Test".to_string(),
            price: price.parse().unwrap(),
            quantity,
            image: None,
        }
    }

    #[test]
    fn test_compute_total() {
        let lines = vec![line("99.50", 2), line("10.00", 3)];
        assert_eq!(Order::compute_total(&lines), "229.00".parse().unwrap());
    }

    #[test]
    fn test_compute_total_empty() {
        assert_eq!(Order::compute_total(&[]), Decimal::ZERO);
    }
}
