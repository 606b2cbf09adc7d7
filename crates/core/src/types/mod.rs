//! Core types for Brewhouse.
//!
//! Type-safe wrappers for the domain concepts shared across the site.

pub mod email;
pub mod id;
pub mod username;

pub use email::{Email, EmailError};
pub use id::{OrderId, UserId};
pub use username::{Username, UsernameError};
