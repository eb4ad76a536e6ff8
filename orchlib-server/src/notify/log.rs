//! Simulated delivery: render the email and log it

use async_trait::async_trait;
use orchlib_common::notification::NotificationPayload;
use orchlib_common::Result;
use tracing::info;

use super::Notifier;

pub struct LogNotifier {
    signature: String,
}

impl LogNotifier {
    pub fn new(signature: &str) -> Self {
        Self {
            signature: signature.to_string(),
        }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn deliver(&self, payload: &NotificationPayload) -> Result<()> {
        let email = payload.render(&self.signature);
        info!(
            to = %email.to_email,
            subject = %email.subject,
            "Email (simulated): {}",
            payload.score_label()
        );
        Ok(())
    }
}
