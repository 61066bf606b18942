use std::time::Duration;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::debug;
use crate::strategy::{Delivery, DeliveryStrategy, OutgoingEmail};
use crate::{NotifyError, NotifyResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Provider relay over TLS, as configured for the mail backend.
    Relay,
    /// Plain connection to a host/port, upgraded with STARTTLS when asked to.
    Direct { starttls: bool },
}

/// SMTP delivery through lettre.
///
/// Transports are built per message; sending happens on the blocking pool.
#[derive(Clone)]
pub struct SmtpStrategy {
    name: &'static str,
    host: String,
    port: u16,
    mode: Mode,
    credentials: Option<Credentials>,
    timeout: Duration,
}

impl SmtpStrategy {
    pub fn relay(host: impl Into<String>, port: u16, username: String, password: String) -> Self {
        Self {
            name: "smtp-relay",
            host: host.into(),
            port,
            mode: Mode::Relay,
            credentials: Some(Credentials::new(username, password)),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn direct(
        host: impl Into<String>,
        port: u16,
        starttls: bool,
        credentials: Option<(String, String)>,
    ) -> Self {
        Self {
            name: "smtp-direct",
            host: host.into(),
            port,
            mode: Mode::Direct { starttls },
            credentials: credentials.map(|(user, pass)| Credentials::new(user, pass)),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn build_transport(&self) -> NotifyResult<SmtpTransport> {
        let builder = match self.mode {
            Mode::Relay => SmtpTransport::relay(&self.host)
                .map_err(|e| NotifyError::Smtp(format!("SMTP relay error: {}", e)))?,
            Mode::Direct { starttls: true } => SmtpTransport::starttls_relay(&self.host)
                .map_err(|e| NotifyError::Smtp(format!("STARTTLS setup error: {}", e)))?,
            Mode::Direct { starttls: false } => SmtpTransport::builder_dangerous(&self.host),
        };

        let mut builder = builder.port(self.port).timeout(Some(self.timeout));
        if let Some(credentials) = &self.credentials {
            builder = builder.credentials(credentials.clone());
        }
        Ok(builder.build())
    }
}

fn parse_mailbox(address: &str) -> NotifyResult<Mailbox> {
    address.parse::<Mailbox>().map_err(|e| NotifyError::Address {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

/// Builds the MIME message: plain text alone, or text and HTML as alternatives.
pub fn build_message(email: &OutgoingEmail) -> NotifyResult<Message> {
    let builder = Message::builder()
        .from(parse_mailbox(&email.from)?)
        .to(parse_mailbox(email.to.expose())?)
        .subject(email.subject.clone());

    let message = match &email.html {
        Some(html) => builder.multipart(MultiPart::alternative_plain_html(email.text.clone(), html.clone())),
        None => builder.header(ContentType::TEXT_PLAIN).body(email.text.clone()),
    };

    message.map_err(|e| NotifyError::Message(e.to_string()))
}

#[async_trait]
impl DeliveryStrategy for SmtpStrategy {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn deliver(&self, email: &OutgoingEmail) -> NotifyResult<Delivery> {
        let message = build_message(email)?;
        let mailer = self.build_transport()?;

        debug!("Sending confirmation to {} via {}:{}", email.to, self.host, self.port);

        tokio::task::spawn_blocking(move || {
            mailer
                .send(&message)
                .map_err(|e| NotifyError::Smtp(format!("Failed to send email: {}", e)))
        })
        .await
        .map_err(|e| NotifyError::Smtp(format!("Email task failed: {}", e)))??;

        Ok(Delivery::Sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinebook_shared::Masked;

    fn email(to: &str, html: Option<&str>) -> OutgoingEmail {
        OutgoingEmail {
            from: "Cinebook <tickets@cinebook.test>".to_string(),
            to: Masked(to.to_string()),
            subject: "Your booking confirmation for Heat".to_string(),
            text: "Seats: A1".to_string(),
            html: html.map(str::to_string),
        }
    }

    #[test]
    fn test_build_alternative_message() {
        let message = build_message(&email("dana@example.com", Some("<p>Seats: A1</p>"))).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("Subject: Your booking confirmation for Heat"));
        assert!(raw.contains("To: dana@example.com"));
        assert!(raw.contains("multipart/alternative"));
        assert!(raw.contains("<p>Seats: A1</p>"));
    }

    #[test]
    fn test_build_plain_message() {
        let message = build_message(&email("dana@example.com", None)).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("text/plain"));
        assert!(!raw.contains("multipart"));
    }

    #[test]
    fn test_invalid_recipient() {
        let err = build_message(&email("not an address", None)).unwrap_err();
        assert!(matches!(err, NotifyError::Address { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_an_error() {
        let strategy = SmtpStrategy::direct("127.0.0.1", 1, false, None)
            .with_timeout(Duration::from_secs(2));

        let result = strategy.deliver(&email("dana@example.com", None)).await;
        assert!(matches!(result, Err(NotifyError::Smtp(_))));
    }
}
