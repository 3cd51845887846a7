//! Email delivery of the finished digest.
//!
//! Submission follows the usual port-587 flow: connect, STARTTLS, log in
//! with the sender address and credential, submit one message addressed to
//! every recipient. Failures never escape [`send_email`]; they are logged
//! and reported as `false`.

use crate::errors::DeliveryError;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{error, info, instrument};

/// SMTP submission endpoint and login.
#[derive(Clone)]
pub struct SmtpSettings {
    pub server: String,
    pub port: u16,
    pub sender: String,
    pub credential: String,
}

impl std::fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("sender", &self.sender)
            .finish()
    }
}

/// Sink for a rendered digest.
pub trait Mailer {
    /// Send one message. Returns whether it was accepted.
    async fn send(&self, subject: &str, body: &str, is_html: bool) -> bool;
}

/// [`Mailer`] that submits over SMTP to a fixed recipient list.
#[derive(Debug, Clone)]
pub struct SmtpMailer {
    pub settings: SmtpSettings,
    pub recipients: Vec<String>,
}

impl Mailer for SmtpMailer {
    async fn send(&self, subject: &str, body: &str, is_html: bool) -> bool {
        send_email(&self.settings, &self.recipients, subject, body, is_html).await
    }
}

fn mailbox(address: &str) -> Result<Mailbox, DeliveryError> {
    address
        .trim()
        .parse::<Mailbox>()
        .map_err(|source| DeliveryError::Address {
            address: address.to_string(),
            source,
        })
}

/// Build the message without sending it.
pub fn build_message(
    sender: &str,
    recipients: &[String],
    subject: &str,
    body: &str,
    is_html: bool,
) -> Result<Message, DeliveryError> {
    if recipients.is_empty() {
        return Err(DeliveryError::NoRecipients);
    }

    let mut builder = Message::builder().from(mailbox(sender)?).subject(subject);
    for recipient in recipients {
        builder = builder.to(mailbox(recipient)?);
    }

    let content_type = if is_html {
        ContentType::TEXT_HTML
    } else {
        ContentType::TEXT_PLAIN
    };
    Ok(builder.header(content_type).body(body.to_string())?)
}

async fn try_send(
    settings: &SmtpSettings,
    recipients: &[String],
    subject: &str,
    body: &str,
    is_html: bool,
) -> Result<(), DeliveryError> {
    let message = build_message(&settings.sender, recipients, subject, body, is_html)?;
    let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.server)?
        .port(settings.port)
        .credentials(Credentials::new(
            settings.sender.clone(),
            settings.credential.clone(),
        ))
        .build();
    transport.send(message).await?;
    Ok(())
}

/// Send a digest. Never fails past this boundary.
#[instrument(level = "info", skip(settings, body), fields(server = %settings.server, recipients = recipients.len()))]
pub async fn send_email(
    settings: &SmtpSettings,
    recipients: &[String],
    subject: &str,
    body: &str,
    is_html: bool,
) -> bool {
    match try_send(settings, recipients, subject, body, is_html).await {
        Ok(()) => {
            info!("Email sent");
            true
        }
        Err(e) => {
            error!(error = %e, "Failed to send email");
            false
        }
    }
}
