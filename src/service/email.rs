use async_trait::async_trait;
use lettre::{
    message::{header, Mailbox, Message},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Tokio1Executor,
};
use std::time::Duration;

use crate::config::MailConfig;

const DEFAULT_SMTP_PORT: u16 = 587;
const SMTP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("invalid address {address:?}: {source}")]
    Address {
        address: String,
        source: lettre::address::AddressError,
    },
    #[error("build message failed: {0}")]
    Build(#[from] lettre::error::Error),
    #[error("smtp error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

#[async_trait]
pub trait MailService: Send + Sync {
    async fn send_welcome(&self, to: &str, name: &str) -> Result<(), MailError>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    app_name: String,
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailError> {
    address.parse().map_err(|source| MailError::Address {
        address: address.to_string(),
        source,
    })
}

fn smtp_port(cfg: &MailConfig) -> u16 {
    cfg.port.trim().parse().unwrap_or(DEFAULT_SMTP_PORT)
}

fn welcome_body(app_name: &str, name: &str) -> String {
    format!(
        "Hi {name},\n\nYour {app_name} account is ready. You can sign in with the email \
         address this message was sent to.\n"
    )
}

impl SmtpMailer {
    /// `None` when `MAIL_HOST` is empty; mail delivery is then disabled.
    pub fn from_config(cfg: &MailConfig, app_name: &str) -> Result<Option<Self>, MailError> {
        if !cfg.is_enabled() {
            return Ok(None);
        }
        let from = parse_mailbox(&cfg.from)?;
        let port = smtp_port(cfg);

        let transport = if cfg.username.is_empty() {
            // Local catchers (Mailpit, MailHog) speak plain SMTP.
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&cfg.host)
                .port(port)
                .timeout(Some(SMTP_TIMEOUT))
                .build()
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.host)?
                .port(port)
                .timeout(Some(SMTP_TIMEOUT))
                .credentials(Credentials::new(
                    cfg.username.clone(),
                    cfg.password.clone(),
                ))
                .build()
        };

        Ok(Some(Self {
            transport,
            from,
            app_name: app_name.to_string(),
        }))
    }
}

#[async_trait]
impl MailService for SmtpMailer {
    async fn send_welcome(&self, to: &str, name: &str) -> Result<(), MailError> {
        let msg = Message::builder()
            .from(self.from.clone())
            .to(parse_mailbox(to)?)
            .subject(format!("Welcome to {}", self.app_name))
            .header(header::ContentType::TEXT_PLAIN)
            .body(welcome_body(&self.app_name, name))?;
        self.transport.send(msg).await?;
        Ok(())
    }
}
