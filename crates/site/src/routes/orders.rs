//! Order route handlers: the menu page and the JSON checkout endpoint.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use brewhouse_core::OrderId;

use crate::middleware::auth::{OptionalAuth, RequireAuth};
use crate::models::CartItem;
use crate::services::{OrderError, OrderService};
use crate::state::AppState;

/// A menu entry rendered on the order page.
pub struct MenuEntry {
    pub name: &'static str,
    pub description: &'static str,
    pub price: &'static str,
}

/// The café menu. Prices are display strings; the client submits them back
/// as cart line prices and the server re-validates the arithmetic.
pub const MENU: &[MenuEntry] = &[
    MenuEntry {
        name: "Espresso",
        description: "Double shot, house blend",
        price: "3.20",
    },
    MenuEntry {
        name: "Flat White",
        description: "Espresso with velvety steamed milk",
        price: "4.50",
    },
    MenuEntry {
        name: "Cold Brew",
        description: "18-hour steep, served over ice",
        price: "4.80",
    },
    MenuEntry {
        name: "Chai Latte",
        description: "Spiced black tea with steamed milk",
        price: "4.20",
    },
    MenuEntry {
        name: "Butter Croissant",
        description: "Baked every morning",
        price: "3.50",
    },
    MenuEntry {
        name: "Blueberry Scone",
        description: "With lemon glaze",
        price: "2.75",
    },
    MenuEntry {
        name: "Avocado Toast",
        description: "Sourdough, chili flakes, sea salt",
        price: "8.90",
    },
];

/// Order page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/order.html")]
pub struct OrderTemplate {
    pub username: Option<String>,
    pub menu: &'static [MenuEntry],
}

/// JSON body for `POST /place_order`.
#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    pub cart_items: Vec<CartItem>,
    pub total_amount: Decimal,
    pub address: String,
}

/// JSON response for `POST /place_order`.
#[derive(Debug, Serialize)]
pub struct PlaceOrderResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<OrderId>,
}

/// Display the menu / order page.
pub async fn order_page(OptionalAuth(user): OptionalAuth) -> impl IntoResponse {
    OrderTemplate {
        username: user.map(|u| u.username.to_string()),
        menu: MENU,
    }
}

/// Place an order.
///
/// Requires a logged-in session (401 JSON otherwise). The cart is validated
/// and persisted atomically; the confirmation email is best-effort and only
/// changes the response message.
pub async fn place_order(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(request): Json<PlaceOrderRequest>,
) -> Response {
    let service = OrderService::new(state.pool());

    let order_id = match service
        .place_order(
            &user,
            &request.cart_items,
            request.total_amount,
            &request.address,
        )
        .await
    {
        Ok(order_id) => order_id,
        Err(OrderError::Validation(message)) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(PlaceOrderResponse {
                    success: false,
                    message,
                    order_id: None,
                }),
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!("Order persistence failed: {}", e);
            sentry::capture_error(&e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(PlaceOrderResponse {
                    success: false,
                    message: "Could not place your order, please try again".to_string(),
                    order_id: None,
                }),
            )
                .into_response();
        }
    };

    tracing::info!(order_id = %order_id, username = %user.username, "Order placed");

    // Confirmation email never rolls the order back.
    let message = match state
        .email()
        .send_order_confirmation(
            user.email.as_str(),
            user.username.as_str(),
            &request.cart_items,
            request.total_amount,
            request.address.trim(),
        )
        .await
    {
        Ok(()) => "Order placed, confirmation email sent".to_string(),
        Err(e) => {
            tracing::warn!("Order confirmation email failed: {}", e);
            "Order placed, but the confirmation email could not be sent".to_string()
        }
    };

    Json(PlaceOrderResponse {
        success: true,
        message,
        order_id: Some(order_id),
    })
    .into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_place_order_request_deserializes() {
        let request: PlaceOrderRequest = serde_json::from_str(
            r#"{
                "cart_items": [{"name": "Espresso", "quantity": 2, "price": "3.20"}],
                "total_amount": "6.40",
                "address": "12 Oak Lane"
            }"#,
        )
        .unwrap();
        assert_eq!(request.cart_items.len(), 1);
        assert_eq!(request.total_amount, Decimal::new(640, 2));
    }

    #[test]
    fn test_place_order_response_omits_missing_order_id() {
        let response = PlaceOrderResponse {
            success: false,
            message: "Cart is empty".to_string(),
            order_id: None,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("order_id"));
    }

    #[test]
    fn test_menu_prices_parse_as_decimal() {
        for entry in MENU {
            assert!(entry.price.parse::<Decimal>().is_ok(), "{}", entry.name);
        }
    }
}
