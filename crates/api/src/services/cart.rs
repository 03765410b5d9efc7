//! Cart service: stock reconciliation and joined cart reads.
//!
//! The store reserves stock at add-to-cart time, not at order time. Every
//! cart mutation therefore keeps this invariant:
//!
//! ```text
//! product.stock + sum(cart quantities referencing that product) = constant
//! ```
//!
//! except for admin catalog edits. Setting a quantity computes
//! `delta = requested - current` and applies the inverse to stock; both
//! writes happen in one transaction with the product row locked, so
//! concurrent requests against the same product serialize instead of
//! driving stock negative.

use sqlx::{PgConnection, PgPool};
use tracing::instrument;

use knavetone_core::{ProductId, UserId};

use crate::db::{carts, products};
use crate::error::{AppError, Result};
use crate::models::{CartItem, Product};

/// The stock movement implied by a quantity request.
///
/// Pure bookkeeping, separated out so the arithmetic is testable without a
/// database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockAdjustment {
    /// Take `delta` units out of stock (requested more than currently held).
    Reserve { delta: i32 },
    /// Return `delta` units to stock (requested fewer than currently held).
    Restore { delta: i32 },
    /// Quantity unchanged; no stock movement.
    Unchanged,
}

impl StockAdjustment {
    /// Compute the adjustment for moving a line from `current` (None when no
    /// line exists) to `requested` units.
    #[must_use]
    pub const fn for_request(current: Option<i32>, requested: i32) -> Self {
        let current = match current {
            Some(q) => q,
            None => 0,
        };
        let delta = requested - current;

        if delta > 0 {
            Self::Reserve { delta }
        } else if delta < 0 {
            Self::Restore { delta: -delta }
        } else {
            Self::Unchanged
        }
    }

    /// The signed change to apply to `product.stock`.
    #[must_use]
    pub const fn stock_delta(self) -> i32 {
        match self {
            Self::Reserve { delta } => -delta,
            Self::Restore { delta } => delta,
            Self::Unchanged => 0,
        }
    }
}

/// Cart service.
pub struct CartService<'a> {
    pool: &'a PgPool,
}

impl<'a> CartService<'a> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Fetch the user's cart joined with live product data.
    ///
    /// Lines whose product has since been deleted are filtered out rather
    /// than failing the fetch.
    ///
    /// # Errors
    ///
    /// Returns a database error if the read fails.
    pub async fn items(&self, user_id: UserId) -> Result<Vec<CartItem>> {
        let items = carts::items(self.pool, user_id).await?;
        Ok(items)
    }

    /// Set a cart line to `requested` units, reconciling product stock.
    ///
    /// A request of 0 is equivalent to [`Self::remove_line`]: the line is
    /// deleted and its units returned to stock.
    ///
    /// # Errors
    ///
    /// - `BadRequest` if `requested` is negative
    /// - `NotFound` if the product doesn't exist (or, for a 0 request, the line)
    /// - `InsufficientStock` (naming the available amount) if the increase
    ///   exceeds what's left in stock
    #[instrument(skip(self))]
    pub async fn set_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        requested: i32,
    ) -> Result<()> {
        if requested < 0 {
            return Err(AppError::BadRequest(
                "Quantity must be a non-negative integer.".to_string(),
            ));
        }

        if requested == 0 {
            return self.remove_line(user_id, product_id).await;
        }

        let mut tx = self.pool.begin().await.map_err(map_sqlx)?;

        let (product, current) = lock_product_and_line(&mut tx, user_id, product_id).await?;
        let product =
            product.ok_or_else(|| AppError::NotFound("Product not found.".to_string()))?;

        let adjustment = StockAdjustment::for_request(current, requested);

        if let StockAdjustment::Reserve { delta } = adjustment
            && product.stock < delta
        {
            return Err(AppError::InsufficientStock {
                available: product.stock,
            });
        }

        if adjustment != StockAdjustment::Unchanged {
            products::adjust_stock(&mut tx, product_id, adjustment.stock_delta()).await?;
        }

        carts::upsert_line(&mut tx, user_id, product_id, requested).await?;

        tx.commit().await.map_err(map_sqlx)?;

        tracing::debug!(%user_id, %product_id, requested, ?adjustment, "Cart line updated");
        Ok(())
    }

    /// Remove a cart line, restoring its quantity to product stock.
    ///
    /// If the referenced product no longer exists, the line is still removed
    /// and there is no stock to restore.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user holds no line for this product.
    #[instrument(skip(self))]
    pub async fn remove_line(&self, user_id: UserId, product_id: ProductId) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx)?;

        let (product, quantity) = lock_product_and_line(&mut tx, user_id, product_id).await?;
        let quantity =
            quantity.ok_or_else(|| AppError::NotFound("Cart item not found.".to_string()))?;

        // A dangling line (product deleted while in the cart) has nothing to
        // restore stock to.
        if product.is_some() {
            products::adjust_stock(&mut tx, product_id, quantity).await?;
        }

        carts::delete_line(&mut tx, user_id, product_id).await?;

        tx.commit().await.map_err(map_sqlx)?;

        tracing::debug!(%user_id, %product_id, quantity, "Cart line removed");
        Ok(())
    }
}

/// Acquire the row locks for a cart mutation in canonical order: the product
/// row first, then the cart line.
///
/// Every cart mutation must take its locks through here. Two transactions
/// locking the same (product, line) pair in opposite orders would deadlock
/// under concurrent add and remove requests.
async fn lock_product_and_line(
    conn: &mut PgConnection,
    user_id: UserId,
    product_id: ProductId,
) -> Result<(Option<Product>, Option<i32>)> {
    let product = products::get_for_update(&mut *conn, product_id).await?;
    let quantity = carts::line_quantity(conn, user_id, product_id).await?;
    Ok((product, quantity))
}

fn map_sqlx(e: sqlx::Error) -> AppError {
    AppError::Database(crate::db::RepositoryError::Database(e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjustment_first_add_reserves_full_quantity() {
        let adj = StockAdjustment::for_request(None, 3);
        assert_eq!(adj, StockAdjustment::Reserve { delta: 3 });
        assert_eq!(adj.stock_delta(), -3);
    }

    #[test]
    fn test_adjustment_increase_reserves_only_delta() {
        let adj = StockAdjustment::for_request(Some(3), 5);
        assert_eq!(adj, StockAdjustment::Reserve { delta: 2 });
        assert_eq!(adj.stock_delta(), -2);
    }

    #[test]
    fn test_adjustment_decrease_restores_delta() {
        let adj = StockAdjustment::for_request(Some(5), 2);
        assert_eq!(adj, StockAdjustment::Restore { delta: 3 });
        assert_eq!(adj.stock_delta(), 3);
    }

    #[test]
    fn test_adjustment_same_quantity_is_noop() {
        let adj = StockAdjustment::for_request(Some(4), 4);
        assert_eq!(adj, StockAdjustment::Unchanged);
        assert_eq!(adj.stock_delta(), 0);
    }

    #[test]
    fn test_adjustment_to_zero_restores_everything() {
        let adj = StockAdjustment::for_request(Some(4), 0);
        assert_eq!(adj, StockAdjustment::Restore { delta: 4 });
        assert_eq!(adj.stock_delta(), 4);
    }

    #[test]
    fn test_stock_plus_cart_is_invariant_across_sequence() {
        // stock=5, add 3, fail to set 6, remove.
        let mut stock = 5;
        let mut cart: Option<i32> = None;

        // add quantity=3
        let adj = StockAdjustment::for_request(cart, 3);
        stock += adj.stock_delta();
        cart = Some(3);
        assert_eq!(stock, 2);

        // set quantity=6: delta 3 > stock 2, rejected; nothing moves
        if let StockAdjustment::Reserve { delta } = StockAdjustment::for_request(cart, 6) {
            assert!(delta > stock);
        } else {
            panic!("expected a reserve");
        }
        assert_eq!(stock, 2);
        assert_eq!(cart, Some(3));

        // remove line
        let adj = StockAdjustment::for_request(cart, 0);
        stock += adj.stock_delta();
        cart = None;
        assert_eq!(stock, 5);
        assert_eq!(cart, None);
    }
}
