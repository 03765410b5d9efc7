//! Cart line database operations.
//!
//! `cart_lines.product_id` carries no foreign key: the product reference is
//! weak by design, so deleting a product leaves dangling lines. The joined
//! reads here use an INNER JOIN, which makes those lines invisible rather
//! than failing the whole cart fetch.

use sqlx::{PgConnection, PgPool};

use knavetone_core::{ProductId, UserId};

use super::RepositoryError;
use crate::models::CartItem;

const ITEM_COLUMNS: &str = "c.product_id, c.quantity, p.name, p.price, p.stock, p.image";

/// Get the current quantity of one cart line, locking the row if it exists.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn line_quantity(
    conn: &mut PgConnection,
    user_id: UserId,
    product_id: ProductId,
) -> Result<Option<i32>, RepositoryError> {
    let row: Option<(i32,)> = sqlx::query_as(
        "SELECT quantity FROM cart_lines WHERE user_id = $1 AND product_id = $2 FOR UPDATE",
    )
    .bind(user_id)
    .bind(product_id)
    .fetch_optional(conn)
    .await?;

    Ok(row.map(|r| r.0))
}

/// Insert or update a cart line to the given quantity.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn upsert_line(
    conn: &mut PgConnection,
    user_id: UserId,
    product_id: ProductId,
    quantity: i32,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        INSERT INTO cart_lines (user_id, product_id, quantity)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id, product_id)
        DO UPDATE SET quantity = EXCLUDED.quantity, updated_at = NOW()
        ",
    )
    .bind(user_id)
    .bind(product_id)
    .bind(quantity)
    .execute(conn)
    .await?;

    Ok(())
}

/// Delete one cart line.
///
/// Returns `true` if a row was deleted.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn delete_line(
    conn: &mut PgConnection,
    user_id: UserId,
    product_id: ProductId,
) -> Result<bool, RepositoryError> {
    let result = sqlx::query("DELETE FROM cart_lines WHERE user_id = $1 AND product_id = $2")
        .bind(user_id)
        .bind(product_id)
        .execute(conn)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Fetch a user's cart joined with the live product state.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn items(pool: &PgPool, user_id: UserId) -> Result<Vec<CartItem>, RepositoryError> {
    let query = format!(
        r"
        SELECT {ITEM_COLUMNS}
        FROM cart_lines c
        JOIN products p ON p.id = c.product_id
        WHERE c.user_id = $1
        ORDER BY c.created_at ASC
        "
    );

    let items = sqlx::query_as::<_, CartItem>(&query)
        .bind(user_id)
        .fetch_all(pool)
        .await?;

    Ok(items)
}

/// Fetch the subset of a user's cart matching the given product ids, joined
/// with the live product state and locked for order placement.
///
/// Ids with no matching line (or whose product was deleted) are simply
/// absent from the result.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn items_for_products(
    conn: &mut PgConnection,
    user_id: UserId,
    product_ids: &[ProductId],
) -> Result<Vec<CartItem>, RepositoryError> {
    let ids: Vec<i32> = product_ids.iter().map(|id| id.as_i32()).collect();

    let query = format!(
        r"
        SELECT {ITEM_COLUMNS}
        FROM cart_lines c
        JOIN products p ON p.id = c.product_id
        WHERE c.user_id = $1 AND c.product_id = ANY($2)
        ORDER BY c.created_at ASC
        FOR UPDATE OF c
        "
    );

    let items = sqlx::query_as::<_, CartItem>(&query)
        .bind(user_id)
        .bind(&ids)
        .fetch_all(conn)
        .await?;

    Ok(items)
}

/// Delete the cart lines matching the given product ids.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn delete_lines(
    conn: &mut PgConnection,
    user_id: UserId,
    product_ids: &[ProductId],
) -> Result<u64, RepositoryError> {
    let ids: Vec<i32> = product_ids.iter().map(|id| id.as_i32()).collect();

    let result = sqlx::query("DELETE FROM cart_lines WHERE user_id = $1 AND product_id = ANY($2)")
        .bind(user_id)
        .bind(&ids)
        .execute(conn)
        .await?;

    Ok(result.rows_affected())
}
