use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::config::SmtpConfig;
use crate::error::DeliveryError;

/// Sends rendered newsletters over STARTTLS SMTP
#[derive(Debug)]
pub struct Mailer {
    config: SmtpConfig,
}

impl Mailer {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    /// Fails with `DeliveryError::MissingConfig` when SMTP variables are unset
    pub fn from_env() -> Result<Self, DeliveryError> {
        Ok(Self::new(SmtpConfig::from_env()?))
    }

    /// "[Radar Saúde] 2025/10/27" for `newsletter-2025-10-27.md`
    pub fn subject_for(path: &Path) -> String {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        let date = stem.strip_prefix("newsletter-").unwrap_or(stem);
        format!("[Radar Saúde] {}", date.replace('-', "/"))
    }

    pub fn build_message(
        &self,
        subject: &str,
        body: String,
        recipients: &[String],
    ) -> Result<Message, DeliveryError> {
        if recipients.is_empty() {
            return Err(DeliveryError::NoRecipients);
        }

        let mut builder = Message::builder()
            .from(parse_mailbox(&self.config.user)?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN);

        for recipient in recipients {
            builder = builder.to(parse_mailbox(recipient)?);
        }

        Ok(builder.body(body)?)
    }

    pub fn send(&self, markdown_path: &Path, recipients: &[String]) -> Result<(), DeliveryError> {
        let body = fs::read_to_string(markdown_path).map_err(|source| DeliveryError::Read {
            path: markdown_path.to_path_buf(),
            source,
        })?;

        let message = self.build_message(&Self::subject_for(markdown_path), body, recipients)?;

        let transport = SmtpTransport::starttls_relay(&self.config.server)?
            .port(self.config.port)
            .credentials(Credentials::new(
                self.config.user.clone(),
                self.config.password.clone(),
            ))
            .build();

        transport.send(&message)?;

        info!(
            server = %self.config.server,
            recipients = recipients.len(),
            "newsletter sent"
        );

        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, DeliveryError> {
    address
        .trim()
        .parse()
        .map_err(|source| DeliveryError::InvalidAddress {
            address: address.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mailer() -> Mailer {
        Mailer::new(SmtpConfig {
            server: "smtp.example.com".to_string(),
            port: 587,
            user: "radar@example.com".to_string(),
            password: "secret".to_string(),
        })
    }

    #[test]
    fn test_subject_from_newsletter_filename() {
        let subject = Mailer::subject_for(Path::new("output/newsletter-2025-10-27.md"));
        assert_eq!(subject, "[Radar Saúde] 2025/10/27");
    }

    #[test]
    fn test_build_message_with_recipients() {
        let recipients = vec!["a@example.com".to_string(), "b@example.com".to_string()];
        let message = mailer()
            .build_message("[Radar Saúde] 2025/10/27", "Corpo".to_string(), &recipients)
            .unwrap();
        assert_eq!(message.envelope().to().len(), 2);
        let formatted = String::from_utf8(message.formatted()).unwrap();
        assert!(formatted.contains("From: radar@example.com"));
    }

    #[test]
    fn test_no_recipients_is_an_error() {
        let err = mailer()
            .build_message("s", "b".to_string(), &[])
            .unwrap_err();
        assert!(matches!(err, DeliveryError::NoRecipients));
    }

    #[test]
    fn test_invalid_address_is_reported() {
        let err = mailer()
            .build_message("s", "b".to_string(), &["not-an-address".to_string()])
            .unwrap_err();
        match err {
            DeliveryError::InvalidAddress { address, .. } => assert_eq!(address, "not-an-address"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_file_fails_before_connecting() {
        let err = mailer()
            .send(Path::new("/nonexistent/newsletter-2025-10-27.md"), &["a@example.com".to_string()])
            .unwrap_err();
        assert!(matches!(err, DeliveryError::Read { .. }));
    }
}
