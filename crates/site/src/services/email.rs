//! Email service for OTP codes, order confirmations, and contact relay.
//!
//! Uses SMTP (STARTTLS) via lettre for delivery with Askama templates for
//! multipart text+HTML bodies. Delivery is best-effort from the caller's
//! point of view: whether a failure is surfaced or swallowed is decided at
//! the call site, per operation.

use std::time::Duration;

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use rust_decimal::Decimal;
use secrecy::ExposeSecret;

use crate::config::EmailConfig;
use crate::models::CartItem;

/// HTML template for the password-reset code email.
#[derive(Template)]
#[template(path = "email/reset_code.html")]
struct ResetCodeEmailHtml<'a> {
    code: &'a str,
}

/// Plain text template for the password-reset code email.
#[derive(Template)]
#[template(path = "email/reset_code.txt")]
struct ResetCodeEmailText<'a> {
    code: &'a str,
}

/// A display-ready order line for the confirmation email.
struct OrderEmailLine {
    name: String,
    quantity: i32,
    price: String,
    subtotal: String,
}

/// HTML template for the order confirmation email.
#[derive(Template)]
#[template(path = "email/order_confirmation.html")]
struct OrderConfirmationEmailHtml<'a> {
    customer_name: &'a str,
    lines: &'a [OrderEmailLine],
    total: String,
    address: &'a str,
}

/// Plain text template for the order confirmation email.
#[derive(Template)]
#[template(path = "email/order_confirmation.txt")]
struct OrderConfirmationEmailText<'a> {
    customer_name: &'a str,
    lines: &'a [OrderEmailLine],
    total: String,
    address: &'a str,
}

/// HTML template for the relayed contact-form message.
#[derive(Template)]
#[template(path = "email/contact_message.html")]
struct ContactMessageEmailHtml<'a> {
    name: &'a str,
    email: &'a str,
    phone: &'a str,
    subject: &'a str,
    message: &'a str,
}

/// Plain text template for the relayed contact-form message.
#[derive(Template)]
#[template(path = "email/contact_message.txt")]
struct ContactMessageEmailText<'a> {
    name: &'a str,
    email: &'a str,
    phone: &'a str,
    subject: &'a str,
    message: &'a str,
}

/// How long to wait on the SMTP relay before giving up.
const SMTP_TIMEOUT_SECONDS: u64 = 10;

/// Errors that can occur when sending email.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Email service for sending transactional mail.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    contact_recipient: String,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay parameters are invalid.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        // Bounded timeout so a stalled relay cannot hold a request open.
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .timeout(Some(Duration::from_secs(SMTP_TIMEOUT_SECONDS)))
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
            contact_recipient: config.contact_recipient.clone(),
        })
    }

    /// Send a password-reset code.
    ///
    /// # Errors
    ///
    /// Returns error if the email fails to send or a template fails to render.
    pub async fn send_reset_code(&self, to: &str, code: &str) -> Result<(), EmailError> {
        let html = ResetCodeEmailHtml { code }.render()?;
        let text = ResetCodeEmailText { code }.render()?;

        self.send_multipart_email(to, "Your Brewhouse password reset code", &text, &html)
            .await
    }

    /// Send an order confirmation after the order has been committed.
    ///
    /// # Errors
    ///
    /// Returns error if the email fails to send or a template fails to render.
    pub async fn send_order_confirmation(
        &self,
        to: &str,
        customer_name: &str,
        items: &[CartItem],
        total: Decimal,
        address: &str,
    ) -> Result<(), EmailError> {
        let lines: Vec<OrderEmailLine> = items
            .iter()
            .map(|item| OrderEmailLine {
                name: item.name.trim().to_owned(),
                quantity: item.quantity,
                price: format!("{:.2}", item.price),
                subtotal: format!("{:.2}", item.subtotal()),
            })
            .collect();

        let html = OrderConfirmationEmailHtml {
            customer_name,
            lines: &lines,
            total: format!("{total:.2}"),
            address,
        }
        .render()?;
        let text = OrderConfirmationEmailText {
            customer_name,
            lines: &lines,
            total: format!("{total:.2}"),
            address,
        }
        .render()?;

        self.send_multipart_email(to, "Order confirmation - Brewhouse", &text, &html)
            .await
    }

    /// Relay a contact-form submission to the site operator.
    ///
    /// # Errors
    ///
    /// Returns error if the email fails to send or a template fails to render.
    pub async fn send_contact_message(
        &self,
        name: &str,
        email: &str,
        phone: Option<&str>,
        subject: &str,
        message: &str,
    ) -> Result<(), EmailError> {
        let phone = phone.unwrap_or("Not provided");

        let html = ContactMessageEmailHtml {
            name,
            email,
            phone,
            subject,
            message,
        }
        .render()?;
        let text = ContactMessageEmailText {
            name,
            email,
            phone,
            subject,
            message,
        }
        .render()?;

        let subject_line = format!("Contact form: {subject}");
        let recipient = self.contact_recipient.clone();
        self.send_multipart_email(&recipient, &subject_line, &text, &html)
            .await
    }

    /// Send a multipart email with both plain text and HTML versions.
    async fn send_multipart_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )?;

        self.mailer.send(email).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_code_templates_render() {
        let html = ResetCodeEmailHtml { code: "007123" }.render().unwrap();
        let text = ResetCodeEmailText { code: "007123" }.render().unwrap();
        assert!(html.contains("007123"));
        assert!(text.contains("007123"));
        assert!(text.contains("10 minutes"));
    }

    #[test]
    fn test_order_confirmation_templates_render() {
        let lines = vec![OrderEmailLine {
            name: "Espresso".to_string(),
            quantity: 2,
            price: "3.20".to_string(),
            subtotal: "6.40".to_string(),
        }];
        let html = OrderConfirmationEmailHtml {
            customer_name: "alice",
            lines: &lines,
            total: "6.40".to_string(),
            address: "12 Oak Lane",
        }
        .render()
        .unwrap();
        assert!(html.contains("Espresso"));
        assert!(html.contains("6.40"));
        assert!(html.contains("12 Oak Lane"));
    }

    #[test]
    fn test_contact_message_templates_render() {
        let text = ContactMessageEmailText {
            name: "Bob",
            email: "bob@example.com",
            phone: "Not provided",
            subject: "Opening hours",
            message: "Are you open on Sundays?",
        }
        .render()
        .unwrap();
        assert!(text.contains("Bob"));
        assert!(text.contains("Opening hours"));
        assert!(text.contains("Not provided"));
    }
}
