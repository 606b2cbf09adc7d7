//! Order service: cart validation and atomic persistence.
//!
//! Policy: a malformed line item rejects the whole order. Skipping bad items
//! would silently diverge the stored order from the claimed total, so the
//! server also checks that the submitted total equals the item sum.

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;

use brewhouse_core::OrderId;

use crate::db::RepositoryError;
use crate::db::orders::OrderRepository;
use crate::models::{CartItem, CurrentUser, NewOrder};

/// Errors that can occur when placing an order.
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    /// The submitted cart failed validation.
    #[error("{0}")]
    Validation(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Order service.
pub struct OrderService<'a> {
    orders: OrderRepository<'a>,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            orders: OrderRepository::new(pool),
        }
    }

    /// Validate a submitted cart and persist the order atomically.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Validation` if the cart, address, total, or any
    /// line item is invalid. Returns `OrderError::Repository` if the
    /// transaction fails; nothing is committed in that case.
    pub async fn place_order(
        &self,
        user: &CurrentUser,
        cart_items: &[CartItem],
        total_amount: Decimal,
        address: &str,
    ) -> Result<OrderId, OrderError> {
        let address = address.trim();

        validate_cart(cart_items, total_amount, address)?;

        let order = NewOrder {
            user_id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            total_amount,
            delivery_address: address.to_owned(),
            order_date: Utc::now(),
        };

        let order_id = self.orders.create_with_items(&order, cart_items).await?;

        Ok(order_id)
    }
}

/// Validate the full cart submission.
///
/// # Errors
///
/// Returns `OrderError::Validation` describing the first failed check.
fn validate_cart(
    cart_items: &[CartItem],
    total_amount: Decimal,
    address: &str,
) -> Result<(), OrderError> {
    if cart_items.is_empty() {
        return Err(OrderError::Validation("Cart is empty".to_owned()));
    }

    if address.is_empty() {
        return Err(OrderError::Validation(
            "Delivery address is required".to_owned(),
        ));
    }

    if total_amount <= Decimal::ZERO {
        return Err(OrderError::Validation("Invalid total amount".to_owned()));
    }

    let mut sum = Decimal::ZERO;
    for item in cart_items {
        if item.name.trim().is_empty() {
            return Err(OrderError::Validation(
                "Every item needs a name".to_owned(),
            ));
        }
        if item.quantity < 1 {
            return Err(OrderError::Validation(format!(
                "Invalid quantity for {}",
                item.name.trim()
            )));
        }
        if item.price <= Decimal::ZERO {
            return Err(OrderError::Validation(format!(
                "Invalid price for {}",
                item.name.trim()
            )));
        }
        sum += item.subtotal();
    }

    if sum != total_amount {
        return Err(OrderError::Validation(
            "Total does not match cart items".to_owned(),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(name: &str, quantity: i32, price: &str) -> CartItem {
        CartItem {
            name: name.to_string(),
            quantity,
            price: price.parse().unwrap(),
        }
    }

    #[test]
    fn test_valid_cart_passes() {
        let items = vec![item("Espresso", 2, "3.20"), item("Scone", 1, "2.75")];
        assert!(validate_cart(&items, "9.15".parse().unwrap(), "12 Oak Lane").is_ok());
    }

    #[test]
    fn test_empty_cart_rejected() {
        let err = validate_cart(&[], Decimal::ONE, "12 Oak Lane").unwrap_err();
        assert!(err.to_string().contains("Cart is empty"));
    }

    #[test]
    fn test_blank_address_rejected() {
        let items = vec![item("Espresso", 1, "3.20")];
        let err = validate_cart(&items, "3.20".parse().unwrap(), "").unwrap_err();
        assert!(err.to_string().contains("address"));
    }

    #[test]
    fn test_nonpositive_total_rejected() {
        let items = vec![item("Espresso", 1, "3.20")];
        let err = validate_cart(&items, Decimal::ZERO, "12 Oak Lane").unwrap_err();
        assert!(err.to_string().contains("total"));
    }

    #[test]
    fn test_malformed_item_rejects_whole_order() {
        // Second of three items is bad: the whole cart is rejected, no
        // partial acceptance.
        let items = vec![
            item("Espresso", 2, "3.20"),
            item("", 1, "2.75"),
            item("Scone", 1, "2.75"),
        ];
        let err = validate_cart(&items, "11.90".parse().unwrap(), "12 Oak Lane").unwrap_err();
        assert!(matches!(err, OrderError::Validation(_)));
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let items = vec![item("Espresso", 0, "3.20")];
        let err = validate_cart(&items, "3.20".parse().unwrap(), "12 Oak Lane").unwrap_err();
        assert!(err.to_string().contains("quantity"));
    }

    #[test]
    fn test_total_mismatch_rejected() {
        let items = vec![item("Espresso", 2, "3.20")];
        let err = validate_cart(&items, "5.00".parse().unwrap(), "12 Oak Lane").unwrap_err();
        assert!(err.to_string().contains("Total"));
    }
}
