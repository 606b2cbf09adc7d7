//! Authentication extractors and session helpers.
//!
//! Route handlers declare their auth requirement through extractors instead
//! of reading the session by hand.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;
use tower_sessions::Session;

use crate::models::{CurrentUser, PasswordReset, session_keys};

/// Extractor that requires a logged-in user.
///
/// Page requests get redirected to the login form; JSON endpoints get a 401
/// with a JSON body the cart script understands.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.username)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Error returned when authentication is required but the user is not logged in.
pub enum AuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized JSON response (for API requests).
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "success": false,
                    "message": "Please log in to place an order",
                })),
            )
                .into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Session is placed in extensions by SessionManagerLayer
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::Unauthorized)?;

        let user: CurrentUser = session
            .get(session_keys::CURRENT_USER)
            .await
            .ok()
            .flatten()
            .ok_or_else(|| {
                let wants_json = parts
                    .headers
                    .get(axum::http::header::ACCEPT)
                    .and_then(|v| v.to_str().ok())
                    .is_some_and(|v| v.contains("application/json"))
                    || parts.uri.path() == "/place_order";
                if wants_json {
                    AuthRejection::Unauthorized
                } else {
                    AuthRejection::RedirectToLogin
                }
            })?;

        Ok(Self(user))
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this does not reject the request if nobody is
/// logged in.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentUser>(session_keys::CURRENT_USER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(user))
    }
}

/// Set the current user in the session (login).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Clear the current user from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    Ok(())
}

/// Read the in-flight password-reset state, if any.
///
/// # Errors
///
/// Returns an error if the session cannot be read.
pub async fn get_password_reset(
    session: &Session,
) -> Result<Option<PasswordReset>, tower_sessions::session::Error> {
    session.get(session_keys::PASSWORD_RESET).await
}

/// Store the in-flight password-reset state, replacing any previous one.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_password_reset(
    session: &Session,
    state: &PasswordReset,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::PASSWORD_RESET, state).await
}

/// Remove the in-flight password-reset state.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_password_reset(
    session: &Session,
) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<PasswordReset>(session_keys::PASSWORD_RESET)
        .await?;
    Ok(())
}
