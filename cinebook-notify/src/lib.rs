//! Booking confirmation delivery.
//!
//! A [`NotificationDispatcher`] renders the confirmation once and hands it to an ordered
//! list of [`DeliveryStrategy`]s (SMTP relay, direct SMTP, disk outbox). The first strategy
//! that accepts the message ends the chain.

pub mod template;
pub mod strategy;
pub mod smtp;
pub mod outbox;
pub mod dispatcher;

pub use dispatcher::NotificationDispatcher;
pub use outbox::OutboxStrategy;
pub use smtp::SmtpStrategy;
pub use strategy::{Delivery, DeliveryStrategy, OutgoingEmail};

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Invalid address {address}: {reason}")]
    Address { address: String, reason: String },
    #[error("Failed to build message: {0}")]
    Message(String),
    #[error("SMTP error: {0}")]
    Smtp(String),
    #[error("Outbox error: {0}")]
    Outbox(#[from] std::io::Error),
}

pub type NotifyResult<T> = Result<T, NotifyError>;
