//! Order route handlers: checkout, order history, and the admin status
//! workflow.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use knavetone_core::{OrderId, OrderStatus, ProductId};

use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireUser};
use crate::models::Order;
use crate::services::OrderService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    /// Cart lines to convert, identified by product id.
    pub product_ids: Vec<ProductId>,
    pub delivery_lat: Option<f64>,
    pub delivery_lng: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    /// One of Pending, Processing, Shipped, Delivered, Cancelled.
    pub status: String,
}

/// `POST /api/orders` - Convert selected cart lines into an order.
pub async fn place(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(payload): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    let delivery = match (payload.delivery_lat, payload.delivery_lng) {
        (Some(lat), Some(lng)) => {
            if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
                return Err(AppError::BadRequest(
                    "Delivery coordinates are out of range.".to_string(),
                ));
            }
            Some((lat, lng))
        }
        (None, None) => None,
        _ => {
            return Err(AppError::BadRequest(
                "Delivery location requires both latitude and longitude.".to_string(),
            ));
        }
    };

    let order = OrderService::new(state.pool(), state.config().strict_order_status)
        .place(user.id, &payload.product_ids, delivery)
        .await?;

    Ok((StatusCode::CREATED, Json(order)))
}

/// `GET /api/orders/my` - The caller's own orders, newest first.
pub async fn list_mine(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderService::new(state.pool(), state.config().strict_order_status)
        .list_for_user(user.id)
        .await?;

    Ok(Json(orders))
}

/// `GET /api/orders` - Every order in the system (admin).
pub async fn list_all(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderService::new(state.pool(), state.config().strict_order_status)
        .list_all()
        .await?;

    Ok(Json(orders))
}

/// `GET /api/orders/{id}` - One order, visible to its owner or any admin.
pub async fn show(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    let order = OrderService::new(state.pool(), state.config().strict_order_status)
        .get_for(id, user.id, user.is_admin)
        .await?;

    Ok(Json(order))
}

/// `PUT /api/orders/{id}/status` - Move an order through its workflow (admin).
pub async fn set_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<OrderId>,
    Json(payload): Json<StatusRequest>,
) -> Result<Json<Order>> {
    let status: OrderStatus = payload
        .status
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid order status '{}'.", payload.status)))?;

    let order = OrderService::new(state.pool(), state.config().strict_order_status)
        .set_status(id, status)
        .await?;

    tracing::info!(admin_id = %admin.id, order_id = %order.id, status = %order.status, "Order status set");
    Ok(Json(order))
}
