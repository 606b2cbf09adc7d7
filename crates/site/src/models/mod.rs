//! Domain models for the site.

pub mod order;
pub mod session;
pub mod user;

pub use order::{CartItem, NewOrder};
pub use session::{CurrentUser, PasswordReset, keys as session_keys};
pub use user::User;
