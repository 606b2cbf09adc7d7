//! User domain types.

use chrono::{DateTime, Utc};

use brewhouse_core::{Email, UserId, Username};

/// A site account.
///
/// The password hash is deliberately not part of this type; repositories
/// return it separately only where credential verification needs it.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Unique username (case-sensitive).
    pub username: Username,
    /// Unique, normalized email address.
    pub email: Email,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the user last logged in, if ever.
    pub last_login: Option<DateTime<Utc>>,
}
