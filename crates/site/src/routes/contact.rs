//! Contact form: relay visitor messages to the operator's inbox.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use brewhouse_core::Email;

use crate::routes::auth::MessageQuery;
use crate::state::AppState;

/// Minimum length of the message body.
const MIN_MESSAGE_LENGTH: usize = 10;

/// Contact form data.
#[derive(Debug, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
}

/// Contact page template.
#[derive(Template, WebTemplate)]
#[template(path = "contact.html")]
pub struct ContactTemplate {
    pub error: Option<String>,
    pub success: Option<String>,
}

fn error_message(code: &str) -> String {
    match code {
        "fields_required" => "Name, email, subject and message are all required".to_string(),
        "invalid_email" => "Please enter a valid email address".to_string(),
        "message_too_short" => {
            format!("Your message must be at least {MIN_MESSAGE_LENGTH} characters")
        }
        other => other.replace('_', " "),
    }
}

fn success_message(code: &str) -> String {
    match code {
        "sent" => "Thanks, we received your message and will get back to you".to_string(),
        other => other.replace('_', " "),
    }
}

/// Display the contact page.
pub async fn contact_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    ContactTemplate {
        error: query.error.as_deref().map(error_message),
        success: query.success.as_deref().map(success_message),
    }
}

/// Handle contact form submission.
///
/// Delivery failures are swallowed: the visitor sees success either way, and
/// the failure is logged for the operator.
pub async fn submit_contact(
    State(state): State<AppState>,
    Form(form): Form<ContactForm>,
) -> Response {
    let name = form.name.trim();
    let subject = form.subject.trim();
    let message = form.message.trim();

    if name.is_empty() || form.email.trim().is_empty() || subject.is_empty() || message.is_empty()
    {
        return Redirect::to("/contact?error=fields_required").into_response();
    }

    let Ok(email) = Email::parse(&form.email) else {
        return Redirect::to("/contact?error=invalid_email").into_response();
    };

    if message.len() < MIN_MESSAGE_LENGTH {
        return Redirect::to("/contact?error=message_too_short").into_response();
    }

    let phone = form
        .phone
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty());

    if let Err(e) = state
        .email()
        .send_contact_message(name, email.as_str(), phone, subject, message)
        .await
    {
        tracing::warn!("Contact relay failed: {}", e);
        sentry::capture_error(&e);
    }

    Redirect::to("/contact?success=sent").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_too_short_names_the_limit() {
        assert!(error_message("message_too_short").contains("10"));
    }
}
