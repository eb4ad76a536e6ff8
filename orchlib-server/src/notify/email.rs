//! Email delivery over SMTP, or to `.eml` files for development

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    Address,
    transport::smtp::authentication::Credentials,
    AsyncFileTransport, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use orchlib_common::config::{EmailConfig, EmailTransportKind};
use orchlib_common::notification::{EmailMessage, NotificationPayload};
use orchlib_common::{Error, Result};
use tracing::{info, warn};

use super::Notifier;

enum EmailTransport {
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    File(AsyncFileTransport<Tokio1Executor>),
}

pub struct EmailNotifier {
    transport: EmailTransport,
    from: Mailbox,
    signature: String,
}

impl EmailNotifier {
    pub fn new(config: &EmailConfig) -> Result<Self> {
        let transport = match config.transport {
            EmailTransportKind::Smtp => {
                let host = config.smtp_host.as_deref().ok_or_else(|| {
                    Error::Config("email.smtp_host is required for the smtp transport".to_string())
                })?;

                if !config.smtp_starttls {
                    warn!("SMTP STARTTLS is disabled; mail is sent in clear text");
                }

                let mut builder = if config.smtp_starttls {
                    AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                        .map_err(|e| Error::Config(format!("SMTP relay {}: {}", host, e)))?
                } else {
                    AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
                }
                .port(config.smtp_port);

                if let (Some(username), Some(password)) =
                    (&config.smtp_username, &config.smtp_password)
                {
                    builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
                }

                info!("Email notifications via SMTP {}:{}", host, config.smtp_port);
                EmailTransport::Smtp(builder.build())
            }
            EmailTransportKind::File => {
                let dir = config.file_dir.as_deref().ok_or_else(|| {
                    Error::Config("email.file_dir is required for the file transport".to_string())
                })?;
                std::fs::create_dir_all(dir)?;

                info!("Email notifications written to {}", dir.display());
                EmailTransport::File(AsyncFileTransport::<Tokio1Executor>::new(dir))
            }
            EmailTransportKind::Log => {
                return Err(Error::Config(
                    "EmailNotifier needs the smtp or file transport".to_string(),
                ));
            }
        };

        let from_address = config
            .from_email
            .parse::<Address>()
            .map_err(|e| Error::Config(format!("email.from_email: {}", e)))?;
        let from = Mailbox::new(Some(config.from_name.clone()), from_address);

        Ok(Self {
            transport,
            from,
            signature: config.from_name.clone(),
        })
    }

    fn build_message(&self, email: &EmailMessage) -> Result<Message> {
        // Display names are quoted on output; only the address is parsed
        let address = email
            .to_email
            .parse::<Address>()
            .map_err(|e| Error::Delivery(format!("recipient '{}': {}", email.to_email, e)))?;
        let to = Mailbox::new(Some(email.to_name.clone()), address);

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(email.body.clone())
            .map_err(|e| Error::Delivery(format!("build email message: {}", e)))
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn deliver(&self, payload: &NotificationPayload) -> Result<()> {
        let message = self.build_message(&payload.render(&self.signature))?;

        match &self.transport {
            EmailTransport::Smtp(smtp) => {
                smtp.send(message)
                    .await
                    .map_err(|e| Error::Delivery(format!("send SMTP email: {}", e)))?;
            }
            EmailTransport::File(file) => {
                file.send(message)
                    .await
                    .map_err(|e| Error::Delivery(format!("write email file: {}", e)))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orchlib_common::notification::NotificationKind;
    use tempfile::TempDir;

    fn payload(email: &str) -> NotificationPayload {
        payload_for("Jan Kowalski", email)
    }

    fn payload_for(name: &str, email: &str) -> NotificationPayload {
        NotificationPayload {
            musician_email: email.into(),
            musician_name: name.into(),
            score_title: "Bolero".into(),
            score_composer: "Maurice Ravel".into(),
            score_part: "Trumpet II".into(),
            kind: NotificationKind::Loan,
        }
    }

    fn file_config(dir: &TempDir) -> EmailConfig {
        EmailConfig {
            transport: EmailTransportKind::File,
            file_dir: Some(dir.path().join("outbox")),
            ..EmailConfig::default()
        }
    }

    #[tokio::test]
    async fn file_transport_writes_message() {
        let dir = TempDir::new().unwrap();
        let notifier = EmailNotifier::new(&file_config(&dir)).unwrap();

        notifier.deliver(&payload("jan@example.org")).await.unwrap();

        let written: Vec<_> = std::fs::read_dir(dir.path().join("outbox"))
            .unwrap()
            .collect();
        assert_eq!(written.len(), 1);
    }

    #[tokio::test]
    async fn names_with_special_characters_are_delivered() {
        let dir = TempDir::new().unwrap();
        let notifier = EmailNotifier::new(&EmailConfig {
            from_name: "Library, Orchestra (scores)".into(),
            ..file_config(&dir)
        })
        .unwrap();

        for name in ["Kowalski, Jan", "Zoë (viola) Smith", "Anna \"Ania\" Nowak"] {
            notifier
                .deliver(&payload_for(name, "jan@example.org"))
                .await
                .unwrap();
        }

        let written = std::fs::read_dir(dir.path().join("outbox")).unwrap().count();
        assert_eq!(written, 3);
    }

    #[tokio::test]
    async fn bad_recipient_is_a_delivery_error() {
        let dir = TempDir::new().unwrap();
        let notifier = EmailNotifier::new(&file_config(&dir)).unwrap();

        let result = notifier.deliver(&payload("not an address")).await;

        assert!(matches!(result, Err(Error::Delivery(_))));
    }

    #[test]
    fn log_transport_is_rejected() {
        assert!(EmailNotifier::new(&EmailConfig::default()).is_err());
    }
}
