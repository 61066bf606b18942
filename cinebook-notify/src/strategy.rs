use std::path::PathBuf;
use async_trait::async_trait;
use cinebook_shared::Masked;
use crate::NotifyResult;

/// A fully rendered message, independent of the transport that will carry it.
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: Masked<String>,
    pub subject: String,
    pub text: String,
    pub html: Option<String>,
}

/// What a strategy did with a message it accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Handed to a mail server.
    Sent,
    /// Kept locally for a later resend; the recipient has not received anything.
    Spooled(PathBuf),
}

/// One way of getting a confirmation out. Strategies are tried in order until one returns `Ok`.
#[async_trait]
pub trait DeliveryStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn deliver(&self, email: &OutgoingEmail) -> NotifyResult<Delivery>;
}
