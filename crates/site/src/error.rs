//! Application error types and HTTP conversion.

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::db::RepositoryError;
use crate::services::{AuthError, EmailError, OrderError, ResetError};

/// Application-level errors that can be converted to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Account/authentication error.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Password-reset workflow error.
    #[error(transparent)]
    Reset(#[from] ResetError),

    /// Order validation or persistence error.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// Email delivery error.
    #[error("email delivery failed: {0}")]
    Email(#[from] EmailError),

    /// Database/repository error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Session store error.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Unexpected internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Auth(AuthError::InvalidCredentials) => StatusCode::UNAUTHORIZED,
            Self::Auth(AuthError::Repository(_)) | Self::Reset(ResetError::Repository(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Auth(_) | Self::Reset(_) | Self::Order(OrderError::Validation(_)) => {
                StatusCode::BAD_REQUEST
            }
            Self::Email(_)
            | Self::Repository(_)
            | Self::Session(_)
            | Self::Internal(_)
            | Self::Order(OrderError::Repository(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Template)]
#[template(path = "errors/500.html")]
struct InternalErrorPage;

#[derive(Template)]
#[template(path = "errors/404.html")]
pub struct NotFoundPage;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
            sentry::capture_error(&self);

            let body = InternalErrorPage
                .render()
                .unwrap_or_else(|_| "Internal Server Error".to_string());
            return (status, Html(body)).into_response();
        }

        tracing::debug!(error = %self, "Request rejected");
        (status, self.to_string()).into_response()
    }
}

/// Fallback handler for unmatched routes.
pub async fn not_found() -> Response {
    let body = NotFoundPage
        .render()
        .unwrap_or_else(|_| "Not Found".to_string());
    (StatusCode::NOT_FOUND, Html(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::Auth(AuthError::InvalidCredentials).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Auth(AuthError::UsernameTaken).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Reset(ResetError::Expired).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Order(OrderError::Validation("bad".into())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
