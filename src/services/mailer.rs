use lettre::message::{header, Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::info;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::services::documents::RenderedDocument;

#[derive(Debug, Clone)]
struct SmtpSettings {
    host: String,
    username: Option<String>,
    password: Option<String>,
}

/// An e-mail with one rendered document attached.
#[derive(Debug, Clone)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub attachment: RenderedDocument,
}

/// Sends invoices and quotes over SMTP.
#[derive(Debug, Clone)]
pub struct Mailer {
    from: String,
    smtp: Option<SmtpSettings>,
}

impl Mailer {
    pub fn new(from: impl Into<String>) -> Self {
        Self { from: from.into(), smtp: None }
    }

    pub fn with_relay(
        mut self,
        host: impl Into<String>,
        username: Option<String>,
        password: Option<String>,
    ) -> Self {
        self.smtp = Some(SmtpSettings { host: host.into(), username, password });
        self
    }

    pub fn from_config(config: &Config) -> Self {
        let mailer = Self::new(config.smtp_from.clone());
        match &config.smtp_host {
            Some(host) => mailer.with_relay(
                host.clone(),
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ),
            None => mailer,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.smtp.is_some()
    }

    pub fn build_message(&self, mail: &OutgoingMail) -> Result<Message> {
        let from: Mailbox = self.from.parse()?;
        let to: Mailbox = mail.to.parse()?;
        let content_type = header::ContentType::parse(mail.attachment.content_type)
            .map_err(|e| Error::Mail(e.to_string()))?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(&mail.subject)
            .multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::plain(mail.body.clone()))
                    .singlepart(
                        Attachment::new(mail.attachment.file_name.clone())
                            .body(mail.attachment.bytes.clone(), content_type),
                    ),
            )?;
        Ok(message)
    }

    /// Send the mail through the configured relay.
    ///
    /// The SMTP transport is blocking, so delivery runs on the blocking pool.
    pub async fn send(&self, mail: OutgoingMail) -> Result<()> {
        let smtp = self
            .smtp
            .clone()
            .ok_or_else(|| Error::Config("SMTP relay is not configured".to_string()))?;
        let message = self.build_message(&mail)?;

        tokio::task::spawn_blocking(move || -> Result<()> {
            let mut builder = SmtpTransport::relay(&smtp.host)?;
            if let (Some(username), Some(password)) = (smtp.username, smtp.password) {
                builder = builder.credentials(Credentials::new(username, password));
            }
            builder.build().send(&message)?;
            Ok(())
        })
        .await
        .map_err(|e| Error::Internal(format!("mail task failed: {}", e)))??;

        info!(to = %mail.to, attachment = %mail.attachment.file_name, "mail sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn mail(to: &str) -> OutgoingMail {
        OutgoingMail {
            to: to.to_string(),
            subject: "Invoice INV-0001".to_string(),
            body: "Please find your invoice attached.".to_string(),
            attachment: RenderedDocument {
                file_name: "invoice_INV-0001.md".to_string(),
                content_type: "text/markdown",
                bytes: b"# Invoice".to_vec(),
                work_dir: PathBuf::from("documents/1/render"),
            },
        }
    }

    #[test]
    fn message_carries_attachment() {
        let mailer = Mailer::new("billing@studio.io");
        let message = mailer.build_message(&mail("ap@acme.com")).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("Subject: Invoice INV-0001"));
        assert!(raw.contains("To: ap@acme.com"));
        assert!(raw.contains("invoice_INV-0001.md"));
        assert!(raw.contains("text/markdown"));
    }

    #[test]
    fn bad_recipient_is_invalid_input() {
        let mailer = Mailer::new("billing@studio.io");
        let err = mailer.build_message(&mail("not an address")).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn sending_without_relay_is_a_config_error() {
        let mailer = Mailer::new("billing@studio.io");
        assert!(!mailer.is_configured());
        let err = mailer.send(mail("ap@acme.com")).await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
