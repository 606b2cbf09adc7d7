//! Order repository for database operations.
//!
//! An order and its line items are always written in one transaction so a
//! failed item insert never leaves a headless order behind.

use sqlx::{PgPool, Row};

use brewhouse_core::OrderId;

use super::RepositoryError;
use crate::models::order::INITIAL_ORDER_STATUS;
use crate::models::{CartItem, NewOrder};

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist an order together with its line items, atomically.
    ///
    /// The caller is responsible for validating the items; this method
    /// requires a non-empty slice and rolls everything back if any insert
    /// fails.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if `items` is empty (a committed
    /// order must have at least one item).
    /// Returns `RepositoryError::Database` if any insert fails; nothing is
    /// committed in that case.
    pub async fn create_with_items(
        &self,
        order: &NewOrder,
        items: &[CartItem],
    ) -> Result<OrderId, RepositoryError> {
        if items.is_empty() {
            return Err(RepositoryError::Conflict(
                "order must have at least one item".to_owned(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let order_row = sqlx::query(
            r"
            INSERT INTO orders
                (user_id, username, email, total_amount, delivery_address, order_date, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            ",
        )
        .bind(order.user_id.as_i32())
        .bind(order.username.as_str())
        .bind(order.email.as_str())
        .bind(order.total_amount)
        .bind(&order.delivery_address)
        .bind(order.order_date)
        .bind(INITIAL_ORDER_STATUS)
        .fetch_one(&mut *tx)
        .await?;

        let order_id: i32 = order_row.try_get("id")?;

        for item in items {
            sqlx::query(
                r"
                INSERT INTO order_items (order_id, item_name, quantity, price)
                VALUES ($1, $2, $3, $4)
                ",
            )
            .bind(order_id)
            .bind(&item.name)
            .bind(item.quantity)
            .bind(item.price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(OrderId::new(order_id))
    }
}
