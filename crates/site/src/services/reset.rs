//! Password-reset OTP workflow.
//!
//! A four-state linear wizard keyed by session state rather than a persisted
//! record:
//!
//! ```text
//! IDLE -> OTP_ISSUED -> OTP_VERIFIED -> COMPLETE
//! ```
//!
//! The continuation state ([`PasswordReset`]) lives in the browser session;
//! this module owns issuing codes, checking them against expiry and the
//! attempt cap, and applying the final credential change. Route handlers do
//! the session reads/writes, so every transition here is a pure function of
//! (state, input, now) and directly testable.

use rand::Rng;
use sqlx::PgPool;

use brewhouse_core::Email;

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::PasswordReset;
use crate::services::auth::{self, AuthError};

/// Seconds an issued code stays valid.
pub const OTP_TTL_SECONDS: i64 = 600;

/// Failed verification attempts allowed per issued code.
pub const MAX_OTP_ATTEMPTS: u32 = 5;

/// Errors from the reset workflow.
#[derive(Debug, thiserror::Error)]
pub enum ResetError {
    /// The wizard was invoked out of sequence (no in-flight state).
    #[error("no password reset in progress")]
    InvalidState,

    /// The issued code is older than [`OTP_TTL_SECONDS`].
    #[error("code expired")]
    Expired,

    /// The submitted code does not match the issued one.
    #[error("incorrect code")]
    InvalidCode,

    /// Too many wrong codes were submitted for this issuance.
    #[error("too many incorrect attempts")]
    TooManyAttempts,

    /// No account matches the reset email (should not normally occur).
    #[error("user not found")]
    UserNotFound,

    /// Password validation or hashing failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Outcome of checking a submitted code against the in-flight state.
#[derive(Debug)]
pub enum VerifyResult {
    /// Code matched: store this state (code consumed, email retained) and
    /// move to the reset-password step.
    Verified(PasswordReset),
    /// Code wrong but retries remain: store this updated state and re-render
    /// the form.
    Retry(PasswordReset, ResetError),
    /// Attempt is terminal (expired, attempt cap): clear the reset state and
    /// send the user back to the start of the wizard.
    Rejected(ResetError),
}

/// Password-reset workflow service.
pub struct PasswordResetService<'a> {
    users: UserRepository<'a>,
}

impl<'a> PasswordResetService<'a> {
    /// Create a new reset service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Begin a reset for `email`, if an account exists.
    ///
    /// Returns `Ok(None)` for an unknown email so the caller can respond
    /// exactly as it would for a known one (anti-enumeration); only a known
    /// email yields a code to deliver and state to store.
    ///
    /// # Errors
    ///
    /// Returns `ResetError::Repository` if the lookup fails.
    pub async fn request(
        &self,
        email: &Email,
        now: i64,
    ) -> Result<Option<PasswordReset>, ResetError> {
        let Some(user) = self.users.get_by_email(email).await? else {
            return Ok(None);
        };

        let otp = generate_otp();
        Ok(Some(PasswordReset::issued(
            user.email.clone(),
            otp,
            now,
        )))
    }

    /// Apply the final credential change for a verified reset.
    ///
    /// Validates the new password, hashes it, and overwrites the stored
    /// credential for the session's target email.
    ///
    /// # Errors
    ///
    /// Returns `ResetError::Auth` if the password pair fails validation.
    /// Returns `ResetError::UserNotFound` if the account vanished.
    /// Returns `ResetError::Repository` on persistence failure; the caller
    /// keeps the session state so the user can retry.
    pub async fn complete(
        &self,
        email: &Email,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<(), ResetError> {
        validate_new_password(new_password, confirm_password)?;

        let password_hash = auth::hash_password(new_password)?;

        match self.users.update_password(email, &password_hash).await {
            Ok(()) => Ok(()),
            Err(RepositoryError::NotFound) => Err(ResetError::UserNotFound),
            Err(e) => Err(ResetError::Repository(e)),
        }
    }
}

/// Check a submitted code against the in-flight state.
///
/// `now` is a unix timestamp in seconds. The returned [`VerifyResult`] tells
/// the caller what to do with the session state.
#[must_use]
pub fn verify_code(state: PasswordReset, submitted: &str, now: i64) -> VerifyResult {
    let (Some(otp), Some(issued_at)) = (state.otp.as_deref(), state.issued_at) else {
        // Email-only state means the code was already consumed.
        return VerifyResult::Rejected(ResetError::InvalidState);
    };

    // Valid strictly below the TTL; exactly 600s old is expired.
    if now - issued_at >= OTP_TTL_SECONDS {
        return VerifyResult::Rejected(ResetError::Expired);
    }

    if constant_time_compare(otp, submitted.trim()) {
        return VerifyResult::Verified(PasswordReset::verified(state.email));
    }

    let attempts = state.attempts + 1;
    if attempts >= MAX_OTP_ATTEMPTS {
        return VerifyResult::Rejected(ResetError::TooManyAttempts);
    }

    VerifyResult::Retry(
        PasswordReset {
            attempts,
            ..state
        },
        ResetError::InvalidCode,
    )
}

/// Validate the new/confirm password pair, short-circuiting on the first
/// failure: both non-empty, equal, length >= 6.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` describing the first failed check.
pub fn validate_new_password(new_password: &str, confirm_password: &str) -> Result<(), AuthError> {
    if new_password.is_empty() || confirm_password.is_empty() {
        return Err(AuthError::WeakPassword(
            "both password fields are required".to_owned(),
        ));
    }

    if new_password != confirm_password {
        return Err(AuthError::WeakPassword("passwords do not match".to_owned()));
    }

    auth::validate_password(new_password)
}

/// Generate a 6-digit reset code.
///
/// Drawn uniformly over the full `000000..=999999` range and zero-padded, so
/// codes like `"007123"` occur at the same rate as any other.
#[must_use]
pub fn generate_otp() -> String {
    let code: u32 = rand::rng().random_range(0..1_000_000);
    format!("{code:06}")
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn issued_state(otp: &str, issued_at: i64) -> PasswordReset {
        PasswordReset::issued(
            Email::parse("a@x.com").unwrap(),
            otp.to_string(),
            issued_at,
        )
    }

    #[test]
    fn test_generate_otp_format() {
        for _ in 0..200 {
            let code = generate_otp();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_verify_correct_code_within_ttl() {
        let state = issued_state("007123", 1_000);
        match verify_code(state, "007123", 1_000 + OTP_TTL_SECONDS - 1) {
            VerifyResult::Verified(next) => {
                assert!(next.otp.is_none());
                assert!(next.issued_at.is_none());
                assert_eq!(next.email.as_str(), "a@x.com");
            }
            other => panic!("expected Verified, got {other:?}"),
        }
    }

    #[test]
    fn test_verify_rejects_at_exactly_ttl() {
        let state = issued_state("123456", 1_000);
        match verify_code(state, "123456", 1_000 + OTP_TTL_SECONDS) {
            VerifyResult::Rejected(ResetError::Expired) => {}
            other => panic!("expected Expired, got {other:?}"),
        }
    }

    #[test]
    fn test_verify_wrong_code_keeps_state() {
        let state = issued_state("123456", 1_000);
        match verify_code(state, "654321", 1_001) {
            VerifyResult::Retry(next, ResetError::InvalidCode) => {
                assert_eq!(next.otp.as_deref(), Some("123456"));
                assert_eq!(next.attempts, 1);
            }
            other => panic!("expected Retry, got {other:?}"),
        }
    }

    #[test]
    fn test_verify_attempt_cap() {
        let mut state = issued_state("123456", 1_000);
        for attempt in 1..MAX_OTP_ATTEMPTS {
            state = match verify_code(state, "000000", 1_001) {
                VerifyResult::Retry(next, _) => {
                    assert_eq!(next.attempts, attempt);
                    next
                }
                other => panic!("expected Retry, got {other:?}"),
            };
        }
        match verify_code(state, "000000", 1_001) {
            VerifyResult::Rejected(ResetError::TooManyAttempts) => {}
            other => panic!("expected TooManyAttempts, got {other:?}"),
        }
    }

    #[test]
    fn test_verify_consumed_state_is_invalid() {
        let state = PasswordReset::verified(Email::parse("a@x.com").unwrap());
        match verify_code(state, "123456", 1_000) {
            VerifyResult::Rejected(ResetError::InvalidState) => {}
            other => panic!("expected InvalidState, got {other:?}"),
        }
    }

    #[test]
    fn test_verify_trims_submitted_code() {
        let state = issued_state("123456", 1_000);
        assert!(matches!(
            verify_code(state, " 123456 ", 1_001),
            VerifyResult::Verified(_)
        ));
    }

    #[test]
    fn test_validate_new_password_order_of_checks() {
        // Empty wins over mismatch: one coherent error.
        let err = validate_new_password("", "something").unwrap_err();
        assert!(err.to_string().contains("required"));

        let err = validate_new_password("abcdef", "abcdeg").unwrap_err();
        assert!(err.to_string().contains("do not match"));

        let err = validate_new_password("abc", "abc").unwrap_err();
        assert!(err.to_string().contains("at least 6"));

        assert!(validate_new_password("abcdef", "abcdef").is_ok());
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("123456", "123456"));
        assert!(!constant_time_compare("123456", "123457"));
        assert!(!constant_time_compare("123456", "12345"));
        assert!(constant_time_compare("", ""));
    }
}
