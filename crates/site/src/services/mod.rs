//! Business logic services for the site.
//!
//! # Services
//!
//! - `auth` - Account signup and login (argon2 password credentials)
//! - `reset` - Password-reset OTP workflow (the session-backed wizard)
//! - `orders` - Cart validation and atomic order persistence
//! - `email` - SMTP delivery of OTP, order confirmation, and contact mail

pub mod auth;
pub mod email;
pub mod orders;
pub mod reset;

pub use auth::{AccountService, AuthError};
pub use email::{EmailService, EmailError};
pub use orders::{OrderError, OrderService};
pub use reset::{PasswordResetService, ResetError, VerifyResult};
