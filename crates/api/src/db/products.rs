//! Catalog product database operations.

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use knavetone_core::ProductId;

use super::RepositoryError;
use crate::models::Product;

const PRODUCT_COLUMNS: &str =
    "id, name, brand, category, price, stock, image, description, created_at, updated_at";

/// Parameters for creating a new product.
#[derive(Debug)]
pub struct NewProduct<'a> {
    pub name: &'a str,
    pub brand: &'a str,
    pub category: &'a str,
    pub price: Decimal,
    pub stock: i32,
    pub image: Option<&'a str>,
    pub description: Option<&'a str>,
}

/// List all products, newest first.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list(pool: &PgPool) -> Result<Vec<Product>, RepositoryError> {
    let query = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC");

    let products = sqlx::query_as::<_, Product>(&query)
        .fetch_all(pool)
        .await?;

    Ok(products)
}

/// Get one product by ID.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn get(pool: &PgPool, id: ProductId) -> Result<Option<Product>, RepositoryError> {
    let query = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");

    let product = sqlx::query_as::<_, Product>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(product)
}

/// Get one product by ID with a row lock, for use inside a transaction.
///
/// Cart reconciliation locks the product row so concurrent quantity changes
/// against the same product serialize instead of racing stock below zero.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn get_for_update(
    conn: &mut PgConnection,
    id: ProductId,
) -> Result<Option<Product>, RepositoryError> {
    let query = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1 FOR UPDATE");

    let product = sqlx::query_as::<_, Product>(&query)
        .bind(id)
        .fetch_optional(conn)
        .await?;

    Ok(product)
}

/// Create a new product.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn create(pool: &PgPool, new_product: NewProduct<'_>) -> Result<Product, RepositoryError> {
    let query = format!(
        r"
        INSERT INTO products (name, brand, category, price, stock, image, description)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {PRODUCT_COLUMNS}
        "
    );

    let product = sqlx::query_as::<_, Product>(&query)
        .bind(new_product.name)
        .bind(new_product.brand)
        .bind(new_product.category)
        .bind(new_product.price)
        .bind(new_product.stock)
        .bind(new_product.image)
        .bind(new_product.description)
        .fetch_one(pool)
        .await?;

    Ok(product)
}

/// Replace a product's editable fields.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the product doesn't exist.
pub async fn update(
    pool: &PgPool,
    id: ProductId,
    new_product: NewProduct<'_>,
) -> Result<Product, RepositoryError> {
    let query = format!(
        r"
        UPDATE products
        SET name = $2, brand = $3, category = $4, price = $5,
            stock = $6, image = $7, description = $8, updated_at = NOW()
        WHERE id = $1
        RETURNING {PRODUCT_COLUMNS}
        "
    );

    sqlx::query_as::<_, Product>(&query)
        .bind(id)
        .bind(new_product.name)
        .bind(new_product.brand)
        .bind(new_product.category)
        .bind(new_product.price)
        .bind(new_product.stock)
        .bind(new_product.image)
        .bind(new_product.description)
        .fetch_optional(pool)
        .await?
        .ok_or(RepositoryError::NotFound)
}

/// Delete a product.
///
/// Cart lines referencing it are left in place (weak reference); joined cart
/// reads filter them out.
///
/// Returns `true` if a row was deleted.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn delete(pool: &PgPool, id: ProductId) -> Result<bool, RepositoryError> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Adjust a product's stock by a signed delta, inside a transaction.
///
/// Callers must have validated the delta against available stock first; a
/// CHECK constraint on the column is the last line of defense.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the product doesn't exist.
pub async fn adjust_stock(
    conn: &mut PgConnection,
    id: ProductId,
    delta: i32,
) -> Result<(), RepositoryError> {
    let result = sqlx::query("UPDATE products SET stock = stock + $2, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .bind(delta)
        .execute(conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }

    Ok(())
}
