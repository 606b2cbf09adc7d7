//! Session-related types.
//!
//! Types stored in the session: the logged-in identity and the in-flight
//! password-reset continuation state.

use serde::{Deserialize, Serialize};

use brewhouse_core::{Email, UserId, Username};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's username.
    pub username: Username,
    /// User's email address.
    pub email: Email,
}

/// In-flight password-reset state.
///
/// At most one reset attempt lives in a browser session; a new
/// forgot-password submission overwrites it. The OTP fields are cleared on
/// successful verification, leaving only the target email for the final
/// reset step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordReset {
    /// Email the reset was requested for.
    pub email: Email,
    /// The issued 6-digit code, present until verified.
    pub otp: Option<String>,
    /// Issuance time as a unix timestamp (seconds), present until verified.
    pub issued_at: Option<i64>,
    /// Failed verification attempts against the current code.
    pub attempts: u32,
}

impl PasswordReset {
    /// State for a freshly issued code.
    #[must_use]
    pub const fn issued(email: Email, otp: String, issued_at: i64) -> Self {
        Self {
            email,
            otp: Some(otp),
            issued_at: Some(issued_at),
            attempts: 0,
        }
    }

    /// State after successful verification: code consumed, email retained.
    #[must_use]
    pub const fn verified(email: Email) -> Self {
        Self {
            email,
            otp: None,
            issued_at: None,
            attempts: 0,
        }
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the in-flight password-reset state.
    pub const PASSWORD_RESET: &str = "password_reset";
}
