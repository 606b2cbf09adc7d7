//! Password-reset route handlers.
//!
//! Three pages drive the wizard: forgot-password (request a code),
//! verify-otp (enter the code), reset-password (choose a new password).
//! The in-flight state lives in the session; these handlers do the session
//! reads/writes and delegate every decision to
//! [`crate::services::reset`].
//!
//! Anti-enumeration: the forgot-password response is identical for known and
//! unknown emails, and session state is only written after the code email is
//! actually accepted by the SMTP relay.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde::Deserialize;
use tower_sessions::Session;

use brewhouse_core::Email;

use crate::error::AppError;
use crate::middleware::auth::{clear_password_reset, get_password_reset, set_password_reset};
use crate::routes::auth::MessageQuery;
use crate::services::reset::{self, MAX_OTP_ATTEMPTS, PasswordResetService, ResetError, VerifyResult};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Forgot-password form data.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordForm {
    pub email: String,
}

/// Code-entry form data.
#[derive(Debug, Deserialize)]
pub struct VerifyOtpForm {
    pub otp: String,
}

/// New-password form data.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordForm {
    pub new_password: String,
    pub confirm_password: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Forgot-password page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/forgot_password.html")]
pub struct ForgotPasswordTemplate {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Code-entry page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/verify_otp.html")]
pub struct VerifyOtpTemplate {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// New-password page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/reset_password.html")]
pub struct ResetPasswordTemplate {
    pub error: Option<String>,
}

/// Translate an error code from the query string into display text.
fn error_message(code: &str) -> String {
    match code {
        "email_required" => "Please enter your email address".to_string(),
        "invalid_email" => "Please enter a valid email address".to_string(),
        "send_failed" => "We could not send the email, please try again".to_string(),
        "code_required" => "Please enter the code from your email".to_string(),
        "invalid_code" => "Incorrect code, please try again".to_string(),
        "expired" => "That code has expired, please request a new one".to_string(),
        "too_many_attempts" => {
            format!("Too many incorrect attempts (max {MAX_OTP_ATTEMPTS}), please request a new code")
        }
        "start_over" => "Your reset session has ended, please start again".to_string(),
        "password_required" => "Both password fields are required".to_string(),
        "password_mismatch" => "Passwords do not match".to_string(),
        "password_too_short" => "Password must be at least 6 characters".to_string(),
        "session" => "Something went wrong, please try again".to_string(),
        other => other.replace('_', " "),
    }
}

/// Translate a success code from the query string into display text.
fn success_message(code: &str) -> String {
    match code {
        "code_sent" => {
            "If an account exists for that email, a 6-digit code is on its way".to_string()
        }
        other => other.replace('_', " "),
    }
}

// =============================================================================
// Forgot Password (request a code)
// =============================================================================

/// Display the forgot-password page.
pub async fn forgot_password_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    ForgotPasswordTemplate {
        error: query.error.as_deref().map(error_message),
        success: query.success.as_deref().map(success_message),
    }
}

/// Handle forgot-password form submission.
///
/// Known email: issue a code, email it, and only then store the reset state.
/// Unknown email: identical redirect, nothing stored, nothing sent.
pub async fn forgot_password(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ForgotPasswordForm>,
) -> Result<Response, AppError> {
    if form.email.trim().is_empty() {
        return Ok(Redirect::to("/forgot-password?error=email_required").into_response());
    }

    let Ok(email) = Email::parse(&form.email) else {
        return Ok(Redirect::to("/forgot-password?error=invalid_email").into_response());
    };

    let service = PasswordResetService::new(state.pool());
    let issued = service.request(&email, Utc::now().timestamp()).await?;

    if let Some(reset_state) = issued {
        let otp = reset_state
            .otp
            .as_deref()
            .ok_or_else(|| AppError::Internal("issued reset state without a code".to_owned()))?;

        // Email first, session second: a delivery failure must leave no
        // state the verify step could accept.
        if let Err(e) = state
            .email()
            .send_reset_code(reset_state.email.as_str(), otp)
            .await
        {
            tracing::error!("Failed to send reset code: {}", e);
            sentry::capture_error(&e);
            return Ok(Redirect::to("/forgot-password?error=send_failed").into_response());
        }

        set_password_reset(&session, &reset_state).await?;

        tracing::info!("Reset code issued");
    }

    Ok(Redirect::to("/verify-otp?success=code_sent").into_response())
}

// =============================================================================
// Verify OTP
// =============================================================================

/// Display the code-entry page.
pub async fn verify_otp_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    VerifyOtpTemplate {
        error: query.error.as_deref().map(error_message),
        success: query.success.as_deref().map(success_message),
    }
}

/// Handle code-entry form submission.
pub async fn verify_otp(
    session: Session,
    Form(form): Form<VerifyOtpForm>,
) -> Result<Response, AppError> {
    if form.otp.trim().is_empty() {
        return Ok(Redirect::to("/verify-otp?error=code_required").into_response());
    }

    let Some(reset_state) = get_password_reset(&session).await? else {
        return Ok(Redirect::to("/forgot-password?error=start_over").into_response());
    };

    match reset::verify_code(reset_state, &form.otp, Utc::now().timestamp()) {
        VerifyResult::Verified(next) => {
            set_password_reset(&session, &next).await?;
            Ok(Redirect::to("/reset-password").into_response())
        }
        VerifyResult::Retry(next, _) => {
            set_password_reset(&session, &next).await?;
            Ok(Redirect::to("/verify-otp?error=invalid_code").into_response())
        }
        VerifyResult::Rejected(reason) => {
            clear_password_reset(&session).await?;
            let code = match reason {
                ResetError::Expired => "expired",
                ResetError::TooManyAttempts => "too_many_attempts",
                _ => "start_over",
            };
            Ok(Redirect::to(&format!("/forgot-password?error={code}")).into_response())
        }
    }
}

// =============================================================================
// Reset Password (apply the new credential)
// =============================================================================

/// Display the new-password page, gated on a verified reset state.
pub async fn reset_password_page(
    session: Session,
    Query(query): Query<MessageQuery>,
) -> Result<Response, AppError> {
    let response = match get_password_reset(&session).await? {
        // Code still outstanding: back to the verify step.
        Some(reset_state) if reset_state.otp.is_some() => {
            Redirect::to("/verify-otp").into_response()
        }
        Some(_) => ResetPasswordTemplate {
            error: query.error.as_deref().map(error_message),
        }
        .into_response(),
        None => Redirect::to("/forgot-password?error=start_over").into_response(),
    };

    Ok(response)
}

/// Handle new-password form submission.
pub async fn reset_password(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ResetPasswordForm>,
) -> Result<Response, AppError> {
    let Some(reset_state) = get_password_reset(&session).await? else {
        return Ok(Redirect::to("/forgot-password?error=start_over").into_response());
    };

    if reset_state.otp.is_some() {
        // Not verified yet.
        return Ok(Redirect::to("/verify-otp").into_response());
    }

    // One coherent error per submission, checked in order.
    if form.new_password.is_empty() || form.confirm_password.is_empty() {
        return Ok(Redirect::to("/reset-password?error=password_required").into_response());
    }
    if form.new_password != form.confirm_password {
        return Ok(Redirect::to("/reset-password?error=password_mismatch").into_response());
    }

    let service = PasswordResetService::new(state.pool());
    match service
        .complete(&reset_state.email, &form.new_password, &form.confirm_password)
        .await
    {
        Ok(()) => {
            clear_password_reset(&session).await?;
            tracing::info!("Password reset completed");
            Ok(Redirect::to("/login?success=password_reset").into_response())
        }
        Err(ResetError::Auth(_)) => {
            Ok(Redirect::to("/reset-password?error=password_too_short").into_response())
        }
        Err(ResetError::UserNotFound) => {
            clear_password_reset(&session).await?;
            Ok(Redirect::to("/forgot-password?error=start_over").into_response())
        }
        // Persistence failure: session state kept so the user can retry
        // without requesting a new code.
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_attempt_cap_mentions_limit() {
        assert!(error_message("too_many_attempts").contains('5'));
    }

    #[test]
    fn test_success_message_is_enumeration_safe() {
        // The same text serves known and unknown emails.
        assert!(success_message("code_sent").contains("If an account exists"));
    }
}
