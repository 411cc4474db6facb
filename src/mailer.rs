use std::fmt;

use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::error::ReportError;
use crate::models::ContractTable;
use crate::report;

pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 465;
pub const DEFAULT_SUBJECT: &str = "Upcoming Renewals and Expired Contracts Report";

#[derive(Clone)]
pub struct SenderCredentials {
    pub address: String,
    pub password: String,
}

impl fmt::Debug for SenderCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SenderCredentials")
            .field("address", &self.address)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Hands a composed message to a mail-submission channel.
pub trait MailTransport {
    fn submit(&self, credentials: &SenderCredentials, message: &Message) -> Result<(), ReportError>;
}

/// Implicit-TLS SMTP submission. A connection is opened per call and closed
/// when the call returns.
#[derive(Debug, Clone)]
pub struct SmtpMailer {
    pub host: String,
    pub port: u16,
}

impl MailTransport for SmtpMailer {
    fn submit(&self, credentials: &SenderCredentials, message: &Message) -> Result<(), ReportError> {
        let transport = SmtpTransport::relay(&self.host)
            .map_err(|e| ReportError::Delivery(format!("cannot reach {}: {e}", self.host)))?
            .port(self.port)
            .credentials(Credentials::new(
                credentials.address.clone(),
                credentials.password.clone(),
            ))
            .build();

        match transport.send(message) {
            Ok(response) => {
                tracing::debug!(code = %response.code(), "server accepted message");
                Ok(())
            }
            Err(err) => {
                let code = err.status().map(|code| code.to_string());
                let message = err.to_string();
                if is_auth_failure(code.as_deref(), &message) {
                    Err(ReportError::Authentication(message))
                } else {
                    Err(ReportError::Delivery(message))
                }
            }
        }
    }
}

// 454 is also used for "TLS not available" and other temporary failures.
fn is_auth_failure(code: Option<&str>, message: &str) -> bool {
    let message = message.to_lowercase();
    match code {
        Some("530" | "534" | "535") => true,
        Some("454") => message.contains("auth"),
        Some(_) => false,
        None => message.contains("authentication mechanism"),
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, ReportError> {
    address
        .trim()
        .parse()
        .map_err(|e: lettre::address::AddressError| ReportError::InvalidAddress {
            address: address.to_string(),
            reason: e.to_string(),
        })
}

pub fn compose_report(
    sender: &str,
    recipients: &[String],
    subject: &str,
    upcoming: &ContractTable,
    expired: &ContractTable,
) -> Result<Message, ReportError> {
    if recipients.is_empty() {
        return Err(ReportError::NoRecipients);
    }

    let mut builder = Message::builder()
        .from(parse_mailbox(sender)?)
        .subject(subject);
    for recipient in recipients {
        builder = builder.to(parse_mailbox(recipient)?);
    }

    let body = report::render_report_html(upcoming, expired);
    builder
        .multipart(MultiPart::alternative().singlepart(SinglePart::html(body)))
        .map_err(|e| ReportError::Compose(e.to_string()))
}

/// Composes the renewal report and sends it to every recipient in a single
/// submission. Nothing is sent when composition fails.
pub fn send_report(
    transport: &impl MailTransport,
    credentials: &SenderCredentials,
    recipients: &[String],
    subject: &str,
    upcoming: &ContractTable,
    expired: &ContractTable,
) -> Result<(), ReportError> {
    tracing::debug!(recipients = recipients.len(), "composing report email");
    let message = compose_report(&credentials.address, recipients, subject, upcoming, expired)?;

    tracing::info!(
        recipients = recipients.len(),
        upcoming = upcoming.len(),
        expired = expired.len(),
        "sending report email"
    );
    match transport.submit(credentials, &message) {
        Ok(()) => {
            tracing::info!("report email sent");
            Ok(())
        }
        Err(err) => {
            tracing::error!(error = %err, "report email failed");
            Err(err)
        }
    }
}
