use async_trait::async_trait;
use tracing::{error, info, warn};
use cinebook_core::{BookingConfirmation, BookingNotifier};
use crate::strategy::{Delivery, DeliveryStrategy, OutgoingEmail};
use crate::template;

/// Sends booking confirmations through an ordered chain of delivery strategies.
pub struct NotificationDispatcher {
    from: String,
    strategies: Vec<Box<dyn DeliveryStrategy>>,
}

impl NotificationDispatcher {
    pub fn new(from: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            strategies: Vec::new(),
        }
    }

    pub fn with_strategy(mut self, strategy: impl DeliveryStrategy + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }
}

#[async_trait]
impl BookingNotifier for NotificationDispatcher {
    async fn notify_booking(&self, confirmation: &BookingConfirmation) -> bool {
        let to = match &confirmation.customer.email {
            Some(to) => to.clone(),
            None => {
                info!("Customer {} has no e-mail address, skipping confirmation", confirmation.customer.id);
                return false;
            }
        };

        let rendered = template::render(confirmation);
        let email = OutgoingEmail {
            from: self.from.clone(),
            to,
            subject: rendered.subject,
            text: rendered.text,
            html: Some(rendered.html),
        };

        for strategy in &self.strategies {
            match strategy.deliver(&email).await {
                Ok(Delivery::Sent) => {
                    info!("Booking confirmation sent to {} via {}", email.to, strategy.name());
                    return true;
                }
                Ok(Delivery::Spooled(path)) => {
                    warn!(
                        "Booking confirmation for {} not sent, kept at {}",
                        email.to,
                        path.display()
                    );
                    return false;
                }
                Err(e) => {
                    warn!("Delivery via {} failed for {}: {}", strategy.name(), email.to, e);
                }
            }
        }

        error!("All delivery strategies failed for {}", email.to);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};
    use crate::template::tests::confirmation;
    use crate::{NotifyError, NotifyResult, OutboxStrategy};

    #[derive(Clone, Copy)]
    enum Script {
        Failing,
        Sending,
        Spooling,
    }
    use Script::{Failing, Sending, Spooling};

    /// Records every attempt and answers as scripted.
    struct Scripted {
        name: &'static str,
        script: Script,
        attempts: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl DeliveryStrategy for Scripted {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn deliver(&self, email: &OutgoingEmail) -> NotifyResult<Delivery> {
            assert_eq!(email.to.expose(), "dana@example.com");
            self.attempts.lock().unwrap().push(self.name);
            match self.script {
                Failing => Err(NotifyError::Smtp("connection refused".to_string())),
                Sending => Ok(Delivery::Sent),
                Spooling => Ok(Delivery::Spooled(PathBuf::from("/tmp/outbox/booking.txt"))),
            }
        }
    }

    fn dispatcher(chain: &[(&'static str, Script)]) -> (NotificationDispatcher, Arc<Mutex<Vec<&'static str>>>) {
        let attempts = Arc::new(Mutex::new(Vec::new()));
        let mut dispatcher = NotificationDispatcher::new("tickets@cinebook.test");
        for &(name, script) in chain {
            dispatcher = dispatcher.with_strategy(Scripted {
                name,
                script,
                attempts: attempts.clone(),
            });
        }
        (dispatcher, attempts)
    }

    #[tokio::test]
    async fn test_first_success_stops_the_chain() {
        let (dispatcher, attempts) = dispatcher(&[("relay", Sending), ("direct", Sending)]);

        assert!(dispatcher.notify_booking(&confirmation(Some("dana@example.com"))).await);
        assert_eq!(*attempts.lock().unwrap(), vec!["relay"]);
    }

    #[tokio::test]
    async fn test_falls_back_in_order() {
        let (dispatcher, attempts) = dispatcher(&[("relay", Failing), ("direct", Sending), ("outbox", Spooling)]);

        assert!(dispatcher.notify_booking(&confirmation(Some("dana@example.com"))).await);
        assert_eq!(*attempts.lock().unwrap(), vec!["relay", "direct"]);
    }

    #[tokio::test]
    async fn test_spooled_counts_as_not_delivered() {
        let (dispatcher, attempts) = dispatcher(&[("relay", Failing), ("direct", Failing), ("outbox", Spooling)]);

        assert!(!dispatcher.notify_booking(&confirmation(Some("dana@example.com"))).await);
        assert_eq!(*attempts.lock().unwrap(), vec!["relay", "direct", "outbox"]);
    }

    #[tokio::test]
    async fn test_everything_failing_returns_false() {
        let (dispatcher, _) = dispatcher(&[("relay", Failing), ("direct", Failing)]);
        assert!(!dispatcher.notify_booking(&confirmation(Some("dana@example.com"))).await);

        let (empty, _) = self::dispatcher(&[]);
        assert!(!empty.notify_booking(&confirmation(Some("dana@example.com"))).await);
    }

    #[tokio::test]
    async fn test_missing_address_skips_delivery() {
        let (dispatcher, attempts) = dispatcher(&[("relay", Sending)]);

        assert!(!dispatcher.notify_booking(&confirmation(None)).await);
        assert!(attempts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_real_outbox_at_the_end_of_the_chain() {
        let dir = tempfile::tempdir().unwrap();
        let dispatcher = NotificationDispatcher::new("tickets@cinebook.test")
            .with_strategy(OutboxStrategy::new(dir.path()));
        assert_eq!(dispatcher.strategy_names(), vec!["outbox"]);

        assert!(!dispatcher.notify_booking(&confirmation(Some("dana@example.com"))).await);

        let files: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(files.len(), 2);
    }
}
