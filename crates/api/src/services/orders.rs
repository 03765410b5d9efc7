//! Order service: placement from cart lines and status workflow.

use sqlx::PgPool;
use tracing::instrument;

use knavetone_core::{OrderId, OrderStatus, ProductId, UserId};

use crate::db::{carts, orders};
use crate::error::{AppError, Result};
use crate::models::{Order, OrderLine};

/// Order service.
pub struct OrderService<'a> {
    pool: &'a PgPool,
    /// When true, status changes must follow the transition graph.
    strict_status: bool,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, strict_status: bool) -> Self {
        Self {
            pool,
            strict_status,
        }
    }

    /// Convert the selected cart lines into an order.
    ///
    /// Each matched line is snapshotted (product id, name, price, quantity,
    /// image) from the live product join; the total is computed once from
    /// those snapshots. The converted lines are removed from the cart. Stock
    /// is not touched - it was already reserved at add-to-cart time.
    ///
    /// Selected ids that match no cart line (including lines whose product
    /// was deleted) are skipped; the order contains only the matches.
    ///
    /// # Errors
    ///
    /// Returns `BadRequest` if the selection is empty or matches nothing.
    #[instrument(skip(self, product_ids), fields(selected = product_ids.len()))]
    pub async fn place(
        &self,
        user_id: UserId,
        product_ids: &[ProductId],
        delivery: Option<(f64, f64)>,
    ) -> Result<Order> {
        if product_ids.is_empty() {
            return Err(AppError::BadRequest(
                "No items selected for checkout.".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await.map_err(map_sqlx)?;

        let items = carts::items_for_products(&mut tx, user_id, product_ids).await?;
        if items.is_empty() {
            return Err(AppError::BadRequest(
                "None of the selected items are in your cart.".to_string(),
            ));
        }

        let lines: Vec<orders::NewOrderLine> = items
            .iter()
            .map(|item| orders::NewOrderLine {
                product_id: item.product_id,
                name: item.name.clone(),
                price: item.price,
                quantity: item.quantity,
                image: item.image.clone(),
            })
            .collect();

        let total_amount = lines
            .iter()
            .map(|line| line.price * rust_decimal::Decimal::from(line.quantity))
            .sum();

        let order = orders::create(&mut tx, user_id, &lines, total_amount, delivery).await?;

        let converted: Vec<ProductId> = items.iter().map(|item| item.product_id).collect();
        carts::delete_lines(&mut tx, user_id, &converted).await?;

        tx.commit().await.map_err(map_sqlx)?;

        tracing::info!(
            order_id = %order.id,
            %user_id,
            lines = order.lines.len(),
            total = %order.total_amount,
            "Order placed"
        );
        Ok(order)
    }

    /// Fetch one order, visible to its owner or any admin.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the order doesn't exist, `Forbidden` if the
    /// caller is neither the owner nor an admin.
    pub async fn get_for(
        &self,
        order_id: OrderId,
        requester: UserId,
        requester_is_admin: bool,
    ) -> Result<Order> {
        let order = orders::get(self.pool, order_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found.".to_string()))?;

        if order.user_id != requester && !requester_is_admin {
            return Err(AppError::Forbidden(
                "You may only view your own orders.".to_string(),
            ));
        }

        Ok(order)
    }

    /// List a user's own orders.
    ///
    /// # Errors
    ///
    /// Returns a database error if the read fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        let orders = orders::list_for_user(self.pool, user_id).await?;
        Ok(orders)
    }

    /// List every order (admin view).
    ///
    /// # Errors
    ///
    /// Returns a database error if the read fails.
    pub async fn list_all(&self) -> Result<Vec<Order>> {
        let orders = orders::list_all(self.pool).await?;
        Ok(orders)
    }

    /// Set an order's status.
    ///
    /// In strict mode the transition graph is enforced; in lenient mode any
    /// status may follow any other, matching the permissive workflow of
    /// early deployments.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the order doesn't exist, `InvalidTransition`
    /// if strict mode rejects the change.
    #[instrument(skip(self))]
    pub async fn set_status(&self, order_id: OrderId, status: OrderStatus) -> Result<Order> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx)?;

        let current = orders::get_status_for_update(&mut tx, order_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found.".to_string()))?;

        if self.strict_status && current != status && !current.can_transition_to(status) {
            return Err(AppError::InvalidTransition {
                from: current,
                to: status,
            });
        }

        orders::set_status(&mut tx, order_id, status).await?;
        tx.commit().await.map_err(map_sqlx)?;

        tracing::info!(%order_id, from = %current, to = %status, "Order status changed");

        let order = orders::get(self.pool, order_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found.".to_string()))?;

        Ok(order)
    }
}

/// Snapshot immutability helper: recompute what the stored total should be.
///
/// Exists so tests can assert that stored totals match their snapshot lines
/// regardless of later catalog edits.
#[must_use]
pub fn snapshot_total(lines: &[OrderLine]) -> rust_decimal::Decimal {
    Order::compute_total(lines)
}

fn map_sqlx(e: sqlx::Error) -> AppError {
    AppError::Database(crate::db::RepositoryError::Database(e))
}
