use std::path::{Path, PathBuf};
use async_trait::async_trait;
use chrono::Utc;
use tracing::warn;
use crate::strategy::{Delivery, DeliveryStrategy, OutgoingEmail};
use crate::NotifyResult;

/// Last resort: writes the message to disk so an operator can resend it.
pub struct OutboxStrategy {
    dir: PathBuf,
}

impl OutboxStrategy {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Recipient address reduced to characters that are safe in a file name.
fn file_stem(to: &str) -> String {
    to.replace('@', "_at_")
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '_' })
        .collect()
}

#[async_trait]
impl DeliveryStrategy for OutboxStrategy {
    fn name(&self) -> &'static str {
        "outbox"
    }

    async fn deliver(&self, email: &OutgoingEmail) -> NotifyResult<Delivery> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let timestamp = Utc::now().format("%Y%m%dT%H%M%S%.6fZ");
        let base = format!("booking_{}_{}", file_stem(email.to.expose()), timestamp);

        let txt_path = self.dir.join(format!("{}.txt", base));
        tokio::fs::write(&txt_path, email.text.as_bytes()).await?;

        if let Some(html) = &email.html {
            let html_path = self.dir.join(format!("{}.html", base));
            tokio::fs::write(&html_path, html.as_bytes()).await?;
        }

        warn!("Confirmation for {} saved to {}", email.to, txt_path.display());
        Ok(Delivery::Spooled(txt_path))
    }
}
