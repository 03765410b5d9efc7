//! Order database operations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use knavetone_core::{OrderId, OrderStatus, ProductId, UserId};

use super::RepositoryError;
use crate::models::{Order, OrderLine};

/// An order row before its lines are attached.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    user_id: UserId,
    total_amount: Decimal,
    status: OrderStatus,
    delivery_lat: Option<f64>,
    delivery_lng: Option<f64>,
    created_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, lines: Vec<OrderLine>) -> Order {
        Order {
            id: self.id,
            user_id: self.user_id,
            lines,
            total_amount: self.total_amount,
            status: self.status,
            delivery_lat: self.delivery_lat,
            delivery_lng: self.delivery_lng,
            created_at: self.created_at,
        }
    }
}

/// Snapshot data for one order line, captured at placement time.
#[derive(Debug)]
pub struct NewOrderLine {
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub quantity: i32,
    pub image: Option<String>,
}

const ORDER_COLUMNS: &str =
    "id, user_id, total_amount, status, delivery_lat, delivery_lng, created_at";
const LINE_COLUMNS: &str = "id, order_id, product_id, name, price, quantity, image";

/// Insert an order and its snapshot lines, inside a transaction.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if any insert fails.
pub async fn create(
    conn: &mut PgConnection,
    user_id: UserId,
    lines: &[NewOrderLine],
    total_amount: Decimal,
    delivery: Option<(f64, f64)>,
) -> Result<Order, RepositoryError> {
    let query = format!(
        r"
        INSERT INTO orders (user_id, total_amount, status, delivery_lat, delivery_lng)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {ORDER_COLUMNS}
        "
    );

    let row = sqlx::query_as::<_, OrderRow>(&query)
        .bind(user_id)
        .bind(total_amount)
        .bind(OrderStatus::Pending)
        .bind(delivery.map(|d| d.0))
        .bind(delivery.map(|d| d.1))
        .fetch_one(&mut *conn)
        .await?;

    let line_query = format!(
        r"
        INSERT INTO order_lines (order_id, product_id, name, price, quantity, image)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {LINE_COLUMNS}
        "
    );

    let mut inserted = Vec::with_capacity(lines.len());
    for line in lines {
        let saved = sqlx::query_as::<_, OrderLine>(&line_query)
            .bind(row.id)
            .bind(line.product_id)
            .bind(&line.name)
            .bind(line.price)
            .bind(line.quantity)
            .bind(line.image.as_deref())
            .fetch_one(&mut *conn)
            .await?;
        inserted.push(saved);
    }

    Ok(row.into_order(inserted))
}

/// Get one order with its lines.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn get(pool: &PgPool, id: OrderId) -> Result<Option<Order>, RepositoryError> {
    let query = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");

    let Some(row) = sqlx::query_as::<_, OrderRow>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?
    else {
        return Ok(None);
    };

    let line_query =
        format!("SELECT {LINE_COLUMNS} FROM order_lines WHERE order_id = $1 ORDER BY id ASC");

    let lines = sqlx::query_as::<_, OrderLine>(&line_query)
        .bind(id)
        .fetch_all(pool)
        .await?;

    Ok(Some(row.into_order(lines)))
}

/// List a user's orders, newest first.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_for_user(pool: &PgPool, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
    let query =
        format!("SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC");

    let rows = sqlx::query_as::<_, OrderRow>(&query)
        .bind(user_id)
        .fetch_all(pool)
        .await?;

    attach_lines(pool, rows).await
}

/// List all orders, newest first.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_all(pool: &PgPool) -> Result<Vec<Order>, RepositoryError> {
    let query = format!("SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC");

    let rows = sqlx::query_as::<_, OrderRow>(&query).fetch_all(pool).await?;

    attach_lines(pool, rows).await
}

/// Get an order's current status with a row lock, for a transition check.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn get_status_for_update(
    conn: &mut PgConnection,
    id: OrderId,
) -> Result<Option<OrderStatus>, RepositoryError> {
    let row: Option<(OrderStatus,)> =
        sqlx::query_as("SELECT status FROM orders WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await?;

    Ok(row.map(|r| r.0))
}

/// Overwrite an order's status.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the order doesn't exist.
pub async fn set_status(
    conn: &mut PgConnection,
    id: OrderId,
    status: OrderStatus,
) -> Result<(), RepositoryError> {
    let result = sqlx::query("UPDATE orders SET status = $2 WHERE id = $1")
        .bind(id)
        .bind(status)
        .execute(conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }

    Ok(())
}

/// Fetch lines for a batch of orders and assemble them.
async fn attach_lines(pool: &PgPool, rows: Vec<OrderRow>) -> Result<Vec<Order>, RepositoryError> {
    let ids: Vec<i32> = rows.iter().map(|r| r.id.as_i32()).collect();

    let line_query = format!(
        "SELECT {LINE_COLUMNS} FROM order_lines WHERE order_id = ANY($1) ORDER BY id ASC"
    );

    let mut lines = sqlx::query_as::<_, OrderLine>(&line_query)
        .bind(&ids)
        .fetch_all(pool)
        .await?;

    let mut orders = Vec::with_capacity(rows.len());
    for row in rows {
        let (matching, rest): (Vec<OrderLine>, Vec<OrderLine>) =
            lines.into_iter().partition(|line| line.order_id == row.id);
        lines = rest;
        orders.push(row.into_order(matching));
    }

    Ok(orders)
}
