//! Account route handlers: login, signup, logout.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::AppError;
use crate::middleware::auth::{clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::{AccountService, AuthError};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Signup form data.
#[derive(Debug, Deserialize)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Query parameters for error/success display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Signup page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub error: Option<String>,
}

/// Translate an error code from the query string into display text.
fn error_message(code: &str) -> String {
    match code {
        "credentials" => "Invalid username or password".to_string(),
        "username_taken" => "Username already exists".to_string(),
        "email_taken" => "Email already registered".to_string(),
        "invalid_username" => "Usernames may only contain letters, digits, '.', '_' and '-'".to_string(),
        "invalid_email" => "Please enter a valid email address".to_string(),
        "password_too_short" => "Password must be at least 6 characters".to_string(),
        "fields_required" => "All fields are required".to_string(),
        "session" => "Something went wrong, please try again".to_string(),
        other => other.replace('_', " "),
    }
}

/// Translate a success code from the query string into display text.
fn success_message(code: &str) -> String {
    match code {
        "account_created" => "Account created, you can now log in".to_string(),
        "password_reset" => "Password updated, log in with your new password".to_string(),
        "logged_out" => "You have been logged out".to_string(),
        other => other.replace('_', " "),
    }
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    LoginTemplate {
        error: query.error.as_deref().map(error_message),
        success: query.success.as_deref().map(success_message),
    }
}

/// Handle login form submission.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    if form.username.trim().is_empty() || form.password.is_empty() {
        return Ok(Redirect::to("/login?error=fields_required").into_response());
    }

    let service = AccountService::new(state.pool());
    match service.login(form.username.trim(), &form.password).await {
        Ok(user) => {
            let current_user = CurrentUser {
                id: user.id,
                username: user.username,
                email: user.email,
            };

            set_current_user(&session, &current_user).await?;

            tracing::info!(username = %current_user.username, "User logged in");
            Ok(Redirect::to("/").into_response())
        }
        Err(AuthError::InvalidCredentials) => {
            tracing::debug!("Login failed: bad credentials");
            Ok(Redirect::to("/login?error=credentials").into_response())
        }
        Err(e) => Err(e.into()),
    }
}

// =============================================================================
// Signup Routes
// =============================================================================

/// Display the signup page.
pub async fn signup_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    SignupTemplate {
        error: query.error.as_deref().map(error_message),
    }
}

/// Handle signup form submission.
pub async fn signup(
    State(state): State<AppState>,
    Form(form): Form<SignupForm>,
) -> Result<Response, AppError> {
    if form.username.trim().is_empty() || form.email.trim().is_empty() || form.password.is_empty()
    {
        return Ok(Redirect::to("/signup?error=fields_required").into_response());
    }

    let service = AccountService::new(state.pool());
    let redirect = match service
        .signup(form.username.trim(), &form.password, form.email.trim())
        .await
    {
        Ok(user) => {
            tracing::info!(username = %user.username, "Account created");
            "/login?success=account_created"
        }
        Err(AuthError::UsernameTaken) => "/signup?error=username_taken",
        Err(AuthError::EmailTaken) => "/signup?error=email_taken",
        Err(AuthError::InvalidUsername(_)) => "/signup?error=invalid_username",
        Err(AuthError::InvalidEmail(_)) => "/signup?error=invalid_email",
        Err(AuthError::WeakPassword(_)) => "/signup?error=password_too_short",
        Err(e) => return Err(e.into()),
    };

    Ok(Redirect::to(redirect).into_response())
}

// =============================================================================
// Logout Route
// =============================================================================

/// Handle logout: clear the user and destroy the whole session.
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_user(&session).await {
        tracing::error!("Failed to clear session: {}", e);
    }

    if let Err(e) = session.flush().await {
        tracing::error!("Failed to flush session: {}", e);
    }

    Redirect::to("/login?success=logged_out").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_known_codes() {
        assert_eq!(error_message("credentials"), "Invalid username or password");
        assert_eq!(error_message("username_taken"), "Username already exists");
    }

    #[test]
    fn test_error_message_unknown_code_degrades() {
        assert_eq!(error_message("some_odd_code"), "some odd code");
    }
}
