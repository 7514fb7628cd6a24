use std::sync::Arc;
use std::time::Duration;

use lettre::address::AddressError;
use lettre::message::{Mailbox, header::ContentType};
use lettre::transport::smtp::AsyncSmtpTransportBuilder;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tracing::{debug, warn};

use super::{Delivery, Notifier};
use crate::config::SmtpSettings;
use crate::sink::EventSink;
use crate::types::AlertEvent;
use crate::{SMTPS_PORT, SMTP_TIMEOUT_SECS};

#[derive(Debug, Error)]
enum EmailError {
    #[error("invalid address {address:?}: {source}")]
    Address {
        address: String,
        #[source]
        source: AddressError,
    },
    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("SMTP session failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// How the SMTP session is secured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Security {
    /// TLS from the first byte
    ImplicitTls,
    /// Plain connection upgraded with STARTTLS
    StartTls,
}

impl Security {
    fn for_port(port: u16) -> Self {
        if port == SMTPS_PORT { Self::ImplicitTls } else { Self::StartTls }
    }

    fn transport(
        self,
        server: &str,
    ) -> Result<AsyncSmtpTransportBuilder, lettre::transport::smtp::Error> {
        match self {
            Self::ImplicitTls => AsyncSmtpTransport::<Tokio1Executor>::relay(server),
            Self::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(server),
        }
    }
}

/// SMTP email channel
///
/// Uses implicit TLS on port 465 and STARTTLS on any other port.
pub struct EmailNotifier {
    to: String,
    from: String,
    smtp: SmtpSettings,
    sink: Arc<EventSink>,
}

impl EmailNotifier {
    pub fn new(
        to: impl Into<String>,
        from: impl Into<String>,
        smtp: SmtpSettings,
        sink: Arc<EventSink>,
    ) -> Self {
        Self { to: to.into(), from: from.into(), smtp, sink }
    }

    fn message(&self, alert: &AlertEvent) -> Result<Message, EmailError> {
        Ok(Message::builder()
            .from(mailbox(&self.from)?)
            .to(mailbox(&self.to)?)
            .subject(alert.subject())
            .header(ContentType::TEXT_PLAIN)
            .body(alert.message.clone())?)
    }

    async fn deliver(
        &self,
        server: &str,
        port: u16,
        user: &str,
        alert: &AlertEvent,
    ) -> Result<(), EmailError> {
        let message = self.message(alert)?;

        let transport = Security::for_port(port)
            .transport(server)?
            .port(port)
            .credentials(Credentials::new(user.to_owned(), self.smtp.password.clone()))
            .timeout(Some(Duration::from_secs(SMTP_TIMEOUT_SECS)))
            .build();

        transport.send(message).await?;
        Ok(())
    }
}

fn mailbox(address: &str) -> Result<Mailbox, EmailError> {
    address
        .parse()
        .map_err(|source| EmailError::Address { address: address.to_owned(), source })
}

#[async_trait::async_trait]
impl Notifier for EmailNotifier {
    fn name(&self) -> &str {
        "email"
    }

    async fn send(&self, alert: &AlertEvent) -> Delivery {
        let Some((server, port, user)) = self.smtp.connection() else {
            warn!(endpoint = %alert.endpoint, "SMTP not configured, skipping email alert");
            self.sink.error("SMTP not configured, skipping email alert");
            return Delivery::failed("SMTP not configured");
        };

        match self.deliver(server, port, user, alert).await {
            Ok(()) => {
                debug!(endpoint = %alert.endpoint, to = %self.to, "email alert delivered");
                Delivery::Sent
            }
            Err(e) => {
                // lettre errors already render their cause
                let reason = e.to_string();
                warn!(endpoint = %alert.endpoint, "email alert failed: {reason}");
                self.sink.error(format_args!("email send failed: {reason}"));
                Delivery::failed(reason)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::SharedBuffer;
    use crate::types::{CheckResult, DownReason, Endpoint};

    fn alert() -> AlertEvent {
        let result = CheckResult::down(Endpoint::new("https://fail.test"), DownReason::Timeout);
        AlertEvent::from_result(&result).unwrap()
    }

    fn smtp(server: &str, port: u16) -> SmtpSettings {
        SmtpSettings {
            server: Some(server.into()),
            port: Some(port),
            user: Some("probe".into()),
            password: "secret".into(),
        }
    }

    #[test]
    fn test_security_follows_port() {
        assert_eq!(Security::for_port(465), Security::ImplicitTls);
        assert_eq!(Security::for_port(587), Security::StartTls);
        assert_eq!(Security::for_port(25), Security::StartTls);
    }

    #[test]
    fn test_transport_builds_for_both_securities() {
        assert!(Security::ImplicitTls.transport("smtp.example.com").is_ok());
        assert!(Security::StartTls.transport("smtp.example.com").is_ok());
    }

    #[test]
    fn test_message_headers() {
        let sink = Arc::new(EventSink::with_writer(SharedBuffer::new(), None));
        let notifier = EmailNotifier::new(
            "ops@example.com",
            "health-checker@example.com",
            smtp("localhost", 587),
            sink,
        );

        let raw = String::from_utf8(notifier.message(&alert()).unwrap().formatted()).unwrap();

        assert!(raw.contains("From: health-checker@example.com"));
        assert!(raw.contains("To: ops@example.com"));
        assert!(raw.contains("Subject: Health alert: https://fail.test"));
    }

    #[tokio::test]
    async fn test_unconfigured_smtp_skips_delivery() {
        let buffer = SharedBuffer::new();
        let sink = Arc::new(EventSink::with_writer(buffer.clone(), None));
        let notifier = EmailNotifier::new(
            "ops@example.com",
            "health-checker@example.com",
            SmtpSettings::default(),
            sink,
        );

        let delivery = notifier.send(&alert()).await;

        assert_eq!(delivery, Delivery::failed("SMTP not configured"));
        let records = buffer.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["error"], "SMTP not configured, skipping email alert");
    }

    #[tokio::test]
    async fn test_invalid_recipient_is_logged_failure() {
        let buffer = SharedBuffer::new();
        let sink = Arc::new(EventSink::with_writer(buffer.clone(), None));
        let notifier = EmailNotifier::new(
            "not an address",
            "health-checker@example.com",
            smtp("localhost", 587),
            sink,
        );

        let delivery = notifier.send(&alert()).await;

        match delivery {
            Delivery::Failed { reason } => assert!(reason.contains("invalid address"), "{reason}"),
            Delivery::Sent => panic!("delivery to an invalid address succeeded"),
        }
        let records = buffer.records();
        assert_eq!(records.len(), 1);
        assert!(records[0]["error"].as_str().unwrap().starts_with("email send failed:"));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_logged_failure() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let buffer = SharedBuffer::new();
        let sink = Arc::new(EventSink::with_writer(buffer.clone(), None));
        let notifier = EmailNotifier::new(
            "ops@example.com",
            "health-checker@example.com",
            smtp("127.0.0.1", port),
            sink,
        );

        let delivery = notifier.send(&alert()).await;

        let Delivery::Failed { reason } = delivery else {
            panic!("delivery to a closed port succeeded");
        };
        assert!(reason.starts_with("SMTP session failed: "), "{reason}");
        // The cause is rendered once
        assert_eq!(reason.matches("os error").count(), 1, "{reason}");
        let records = buffer.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["error"], format!("email send failed: {reason}"));
    }

    #[tokio::test]
    async fn test_port_zero_skips_delivery() {
        let buffer = SharedBuffer::new();
        let sink = Arc::new(EventSink::with_writer(buffer.clone(), None));
        let notifier = EmailNotifier::new(
            "ops@example.com",
            "health-checker@example.com",
            smtp("127.0.0.1", 0),
            sink,
        );

        let delivery = notifier.send(&alert()).await;

        assert_eq!(delivery, Delivery::failed("SMTP not configured"));
        let records = buffer.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["error"], "SMTP not configured, skipping email alert");
    }
}
