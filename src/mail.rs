use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::MailConfig;
use crate::error::{AppError, Result};

/// Fully composed outbound message; one delivery attempt per send
#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// External mail transport boundary
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<()>;
}

/// SMTP transport backed by lettre
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> Result<Self> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| AppError::Mail(format!("Invalid SMTP relay: {}", e)))?
            .port(config.smtp_port);

        if let (Some(user), Some(pass)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            transport: builder.build(),
        })
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<()> {
        let from: Mailbox = email
            .from
            .parse()
            .map_err(|e| AppError::Mail(format!("Invalid sender address: {}", e)))?;
        let to: Mailbox = email
            .to
            .parse()
            .map_err(|e| AppError::Mail(format!("Invalid recipient address: {}", e)))?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(&email.subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(email.text.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(email.html.clone()),
                    ),
            )
            .map_err(|e| AppError::Mail(format!("Failed to build message: {}", e)))?;

        tracing::info!(to = %email.to, subject = %email.subject, "sending email via SMTP");
        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::Mail(format!("SMTP send failed: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_util {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::{MailTransport, OutboundEmail};
    use crate::error::{AppError, Result};

    /// Records sends in order; can be told to fail after N deliveries
    #[derive(Default)]
    pub(crate) struct RecordingMailer {
        pub sent: Mutex<Vec<OutboundEmail>>,
        pub fail_after: Option<usize>,
    }

    impl RecordingMailer {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing_after(n: usize) -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail_after: Some(n),
            }
        }
    }

    #[async_trait]
    impl MailTransport for RecordingMailer {
        async fn send(&self, email: &OutboundEmail) -> Result<()> {
            let mut sent = self.sent.lock().unwrap();
            if let Some(limit) = self.fail_after {
                if sent.len() >= limit {
                    return Err(AppError::Mail("simulated transport failure".to_string()));
                }
            }
            sent.push(email.clone());
            Ok(())
        }
    }
}
