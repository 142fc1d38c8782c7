//! Outbound email for the contact form.
//!
//! Delivery is best-effort: a failed send is logged and reported in the
//! response, but never affects the already-persisted message.

use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::Serialize;
use thiserror::Error;

use crate::config::MailConfig;

/// Errors raised while building the mailer from configuration.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid mailbox address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("smtp transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// Outcome of the contact-form email side effects. `None` means the
/// corresponding email was not attempted (disabled in configuration).
#[derive(Debug, Clone, Copy, Serialize, utoipa::ToSchema)]
pub struct DeliveryReport {
    /// Acknowledgement to the visitor.
    pub confirmation_sent: Option<bool>,
    /// Notification to the site owner.
    pub owner_notified: Option<bool>,
}

impl DeliveryReport {
    /// Report for a submission where no email was attempted at all.
    pub fn none() -> Self {
        Self {
            confirmation_sent: None,
            owner_notified: None,
        }
    }
}

pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    owner: Option<Mailbox>,
    send_confirmation: bool,
    notify_owner: bool,
}

impl Mailer {
    /// Build a mailer from configuration. Returns `None` when outbound
    /// email is disabled entirely.
    pub fn from_config(cfg: &MailConfig) -> Result<Option<Self>, MailError> {
        if !cfg.enabled {
            return Ok(None);
        }

        let builder = if cfg.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&cfg.host)
        };
        let mut builder = builder.port(cfg.port);
        if !cfg.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                cfg.username.clone(),
                cfg.password.clone(),
            ));
        }

        let from: Mailbox = cfg.from_address.parse()?;
        let owner = if cfg.owner_address.is_empty() {
            None
        } else {
            Some(cfg.owner_address.parse()?)
        };

        Ok(Some(Self {
            transport: builder.build(),
            from,
            owner,
            send_confirmation: cfg.send_confirmation,
            notify_owner: cfg.notify_owner,
        }))
    }

    /// Send the contact-form side effects: an acknowledgement to the sender
    /// and a notification to the site owner, each independently toggleable.
    pub async fn send_contact_emails(
        &self,
        name: &str,
        sender: &Address,
        message: &str,
    ) -> DeliveryReport {
        let confirmation_sent = if self.send_confirmation {
            Some(self.send_confirmation_email(name, sender).await)
        } else {
            None
        };

        let owner_notified = match &self.owner {
            Some(owner) if self.notify_owner => {
                Some(self.send_owner_notification(name, sender, message, owner).await)
            }
            _ => None,
        };

        DeliveryReport {
            confirmation_sent,
            owner_notified,
        }
    }

    async fn send_confirmation_email(&self, name: &str, sender: &Address) -> bool {
        let body = format!(
            "Hi {name},\n\nThank you for reaching out. Your message has been received \
             and I will get back to you soon.\n"
        );
        let message = Message::builder()
            .from(self.from.clone())
            .to(Mailbox::new(Some(name.to_string()), sender.clone()))
            .subject("Thanks for getting in touch!")
            .body(body);

        self.send("confirmation", message).await
    }

    async fn send_owner_notification(
        &self,
        name: &str,
        sender: &Address,
        message: &str,
        owner: &Mailbox,
    ) -> bool {
        let body = format!("New contact message.\n\nName: {name}\nEmail: {sender}\n\n{message}\n");
        let message = Message::builder()
            .from(self.from.clone())
            .reply_to(Mailbox::new(Some(name.to_string()), sender.clone()))
            .to(owner.clone())
            .subject(format!("New contact message from {name}"))
            .body(body);

        self.send("owner notification", message).await
    }

    async fn send(&self, kind: &str, message: Result<Message, lettre::error::Error>) -> bool {
        let message = match message {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!("failed to build {kind} email: {e}");
                return false;
            }
        };

        match self.transport.send(message).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("{kind} email delivery failed: {e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled_config() -> MailConfig {
        MailConfig {
            enabled: true,
            host: "localhost".into(),
            from_address: "Portfolio <noreply@example.com>".into(),
            owner_address: "owner@example.com".into(),
            ..MailConfig::default()
        }
    }

    #[test]
    fn disabled_config_builds_no_mailer() {
        let cfg = MailConfig::default();
        assert!(Mailer::from_config(&cfg).unwrap().is_none());
    }

    #[tokio::test]
    async fn enabled_config_builds_a_mailer() {
        let mailer = Mailer::from_config(&enabled_config()).unwrap().unwrap();
        assert!(mailer.owner.is_some());
        assert!(mailer.send_confirmation);
        assert!(mailer.notify_owner);
    }

    #[tokio::test]
    async fn empty_owner_address_disables_notifications() {
        let cfg = MailConfig {
            owner_address: String::new(),
            ..enabled_config()
        };
        let mailer = Mailer::from_config(&cfg).unwrap().unwrap();
        assert!(mailer.owner.is_none());
    }

    #[test]
    fn malformed_from_address_is_an_error() {
        let cfg = MailConfig {
            from_address: "not an address".into(),
            ..enabled_config()
        };
        assert!(matches!(
            Mailer::from_config(&cfg),
            Err(MailError::Address(_))
        ));
    }
}
