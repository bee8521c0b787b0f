/// Email relay for contact submissions
///
/// Delivery is best-effort and layered: a transactional provider over HTTP
/// first, plain SMTP as the backup. The caller decides what a total failure
/// means; for the contact endpoint it means a warning in the log and nothing
/// more, because the submission is already stored.

use super::submission::ContactSubmission;
use async_trait::async_trait;
use chrono::Utc;
use lettre::message::MultiPart;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tracing::{info, warn};

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("email provider request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("email provider rejected the message (status {status}): {body}")]
    Api { status: u16, body: String },
    #[error("SMTP delivery failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
    #[error("invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("could not assemble message: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("all {0} email providers failed")]
    AllProvidersFailed(usize),
    #[error("no email provider configured")]
    NoProviders,
}

/// A rendered notification email, ready for any provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactEmail {
    pub subject: String,
    pub text: String,
    pub html: String,
    /// The submitter's address, so the studio can reply directly
    pub reply_to: String,
}

impl ContactEmail {
    /// Render the notification for one submission. Optional lines (phone,
    /// event date) are omitted entirely when absent.
    pub fn build(submission: &ContactSubmission) -> Self {
        let subject = format!(
            "New Contact Form: {} inquiry from {} {}",
            submission.service, submission.first_name, submission.last_name
        );

        let sent_on = Utc::now().format("%A, %-d %B %Y %H:%M");

        let mut text = format!(
            "New Contact Form Submission\n\n\
             Client Information:\n\
             Name: {} {}\n\
             Email: {}\n",
            submission.first_name, submission.last_name, submission.email
        );
        if let Some(phone) = &submission.phone {
            text.push_str(&format!("Phone: {}\n", phone));
        }
        text.push_str(&format!("Service Requested: {}\n", submission.service));
        if let Some(date) = &submission.event_date {
            text.push_str(&format!("Event Date: {}\n", date));
        }
        text.push_str(&format!(
            "\nMessage:\n{}\n\nSent on: {}\n",
            submission.message, sent_on
        ));

        let mut details = format!(
            "<p><strong>Name:</strong> {} {}</p>\n\
             <p><strong>Email:</strong> <a href=\"mailto:{2}\">{2}</a></p>\n",
            escape_html(&submission.first_name),
            escape_html(&submission.last_name),
            escape_html(&submission.email),
        );
        if let Some(phone) = &submission.phone {
            details.push_str(&format!(
                "<p><strong>Phone:</strong> {}</p>\n",
                escape_html(phone)
            ));
        }
        details.push_str(&format!(
            "<p><strong>Service Requested:</strong> {}</p>\n",
            escape_html(&submission.service)
        ));
        if let Some(date) = &submission.event_date {
            details.push_str(&format!(
                "<p><strong>Event Date:</strong> {}</p>\n",
                escape_html(date)
            ));
        }

        let html = format!(
            "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">\n\
             <h2 style=\"border-bottom: 3px solid #d4af37; padding-bottom: 10px;\">\
             New Contact Form Submission</h2>\n\
             {}\
             <div style=\"border-left: 4px solid #d4af37; padding-left: 16px;\">\n\
             <h3>Message</h3>\n<p>{}</p>\n</div>\n\
             <p style=\"font-size: 12px; color: #888;\">Sent on: {}</p>\n\
             </div>",
            details,
            escape_html(&submission.message).replace('\n', "<br>"),
            sent_on,
        );

        ContactEmail {
            subject,
            text,
            html,
            reply_to: submission.email.clone(),
        }
    }
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// One way of getting a notification email out the door.
#[async_trait]
pub trait EmailProvider: Send + Sync {
    fn name(&self) -> &'static str;
    async fn send(&self, email: &ContactEmail) -> Result<(), EmailError>;
}

/// Transactional email over the Resend HTTP API.
pub struct ResendProvider {
    client: reqwest::Client,
    api_key: String,
    from: String,
    to: String,
}

impl ResendProvider {
    pub fn new(api_key: String, from: String, to: String) -> Self {
        ResendProvider {
            client: reqwest::Client::new(),
            api_key,
            from,
            to,
        }
    }
}

#[async_trait]
impl EmailProvider for ResendProvider {
    fn name(&self) -> &'static str {
        "resend"
    }

    async fn send(&self, email: &ContactEmail) -> Result<(), EmailError> {
        let body = serde_json::json!({
            "from": self.from,
            "to": [self.to],
            "subject": email.subject,
            "html": email.html,
            "text": email.text,
            "reply_to": email.reply_to,
        });

        let response = self
            .client
            .post(RESEND_ENDPOINT)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(EmailError::Api { status, body });
        }
        Ok(())
    }
}

/// Plain SMTP backup (Gmail app password or any TLS relay).
pub struct SmtpProvider {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
    to: String,
}

impl SmtpProvider {
    pub fn new(
        host: &str,
        username: String,
        password: String,
        from: String,
        to: String,
    ) -> Result<Self, EmailError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(host)?
            .credentials(Credentials::new(username, password))
            .build();
        Ok(SmtpProvider {
            transport,
            from,
            to,
        })
    }
}

#[async_trait]
impl EmailProvider for SmtpProvider {
    fn name(&self) -> &'static str {
        "smtp"
    }

    async fn send(&self, email: &ContactEmail) -> Result<(), EmailError> {
        let message = Message::builder()
            .from(self.from.parse()?)
            .to(self.to.parse()?)
            .reply_to(email.reply_to.parse()?)
            .subject(email.subject.clone())
            .multipart(MultiPart::alternative_plain_html(
                email.text.clone(),
                email.html.clone(),
            ))?;

        self.transport.send(message).await?;
        Ok(())
    }
}

/// An ordered provider chain: first success wins, every failure is logged.
pub struct Mailer {
    providers: Vec<Box<dyn EmailProvider>>,
}

impl Mailer {
    pub fn new(providers: Vec<Box<dyn EmailProvider>>) -> Self {
        Mailer { providers }
    }

    /// A mailer with no providers; delivery is skipped with a log line.
    pub fn disabled() -> Self {
        Mailer {
            providers: Vec::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.providers.is_empty()
    }

    /// Try each provider in order. Returns the name of the provider that
    /// accepted the message, or an error after the whole chain failed.
    pub async fn deliver(&self, email: &ContactEmail) -> Result<&'static str, EmailError> {
        if self.providers.is_empty() {
            return Err(EmailError::NoProviders);
        }

        for provider in &self.providers {
            match provider.send(email).await {
                Ok(()) => {
                    info!(provider = provider.name(), "✉️  Contact email sent");
                    return Ok(provider.name());
                }
                Err(e) => {
                    warn!(
                        provider = provider.name(),
                        error = %e,
                        "Email provider failed, trying next"
                    );
                }
            }
        }

        Err(EmailError::AllProvidersFailed(self.providers.len()))
    }
}

impl std::fmt::Debug for Mailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.providers.iter().map(|p| p.name()).collect();
        f.debug_struct("Mailer").field("providers", &names).finish()
    }
}
