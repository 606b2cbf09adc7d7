//! Order domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use brewhouse_core::{Email, UserId, Username};

/// A cart line as submitted by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    /// Menu item name.
    pub name: String,
    /// Quantity ordered.
    pub quantity: i32,
    /// Unit price.
    pub price: Decimal,
}

impl CartItem {
    /// Line subtotal (quantity x unit price).
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        Decimal::from(self.quantity) * self.price
    }
}

/// Data needed to persist a new order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    /// Account placing the order.
    pub user_id: UserId,
    /// Username snapshot.
    pub username: Username,
    /// Email snapshot.
    pub email: Email,
    /// Total amount.
    pub total_amount: Decimal,
    /// Delivery address.
    pub delivery_address: String,
    /// Order timestamp.
    pub order_date: DateTime<Utc>,
}

/// Initial status of every new order.
pub const INITIAL_ORDER_STATUS: &str = "Pending";

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_item_subtotal() {
        let item = CartItem {
            name: "Flat White".to_string(),
            quantity: 3,
            price: Decimal::new(450, 2), // 4.50
        };
        assert_eq!(item.subtotal(), Decimal::new(1350, 2)); // 13.50
    }

    #[test]
    fn test_cart_item_deserializes_from_order_payload() {
        let item: CartItem =
            serde_json::from_str(r#"{"name":"Espresso","quantity":2,"price":"3.20"}"#).unwrap();
        assert_eq!(item.name, "Espresso");
        assert_eq!(item.quantity, 2);
        assert_eq!(item.price, Decimal::new(320, 2));
    }
}
