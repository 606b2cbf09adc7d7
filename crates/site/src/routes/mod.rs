//! HTTP route handlers for the site.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                  - Landing page
//! GET  /health            - Liveness check
//! GET  /health/ready      - Readiness check (database ping)
//!
//! # Accounts
//! GET  /login             - Login page
//! POST /login             - Login action
//! GET  /signup            - Signup page
//! POST /signup            - Signup action
//! GET  /logout            - Logout action
//!
//! # Password reset
//! GET  /forgot-password   - Request-reset page
//! POST /forgot-password   - Issue and email an OTP
//! GET  /verify-otp        - Code entry page
//! POST /verify-otp        - Check the submitted code
//! GET  /reset-password    - New-password page
//! POST /reset-password    - Apply the new password
//!
//! # Orders
//! GET  /order             - Menu / order page
//! POST /place_order       - Place an order (JSON)
//!
//! # Contact
//! GET  /contact           - Contact page
//! POST /contact           - Relay a message to the operator
//! ```

pub mod auth;
pub mod contact;
pub mod home;
pub mod orders;
pub mod reset;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the account routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/signup", get(auth::signup_page).post(auth::signup))
        .route("/logout", get(auth::logout))
}

/// Create the password-reset routes router.
pub fn reset_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/forgot-password",
            get(reset::forgot_password_page).post(reset::forgot_password),
        )
        .route(
            "/verify-otp",
            get(reset::verify_otp_page).post(reset::verify_otp),
        )
        .route(
            "/reset-password",
            get(reset::reset_password_page).post(reset::reset_password),
        )
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/order", get(orders::order_page))
        .route("/place_order", post(orders::place_order))
}

/// Create all routes for the site.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .merge(auth_routes())
        .merge(reset_routes())
        .merge(order_routes())
        .route(
            "/contact",
            get(contact::contact_page).post(contact::submit_contact),
        )
}
