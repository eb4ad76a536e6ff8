//! Notification delivery
//!
//! Loan, return and reminder notifications go through a [`Notifier`].
//! Callers use [`notify_best_effort`]: a failed delivery is logged and
//! never changes the outcome of the operation that triggered it.

use async_trait::async_trait;
use orchlib_common::config::{EmailConfig, EmailTransportKind};
use orchlib_common::notification::NotificationPayload;
use orchlib_common::Result;
use std::sync::Arc;
use tracing::{debug, warn};

pub mod email;
pub mod log;

pub use email::EmailNotifier;
pub use log::LogNotifier;

/// Delivery back-end for notification payloads
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one notification. Failures are `Error::Delivery`.
    async fn deliver(&self, payload: &NotificationPayload) -> Result<()>;
}

/// Build the notifier selected by `[email] transport`
pub fn from_config(config: &EmailConfig) -> Result<Arc<dyn Notifier>> {
    Ok(match config.transport {
        EmailTransportKind::Log => Arc::new(LogNotifier::new(&config.from_name)),
        EmailTransportKind::Smtp | EmailTransportKind::File => {
            Arc::new(EmailNotifier::new(config)?)
        }
    })
}

/// Deliver `payload`, logging and swallowing any failure.
///
/// Returns whether delivery succeeded. `loan_id` is only used in logs.
pub async fn notify_best_effort(
    notifier: &dyn Notifier,
    payload: &NotificationPayload,
    loan_id: &str,
) -> bool {
    if let Err(e) = payload.validate() {
        warn!("Skipping {} notification for loan {}: {}", payload.kind, loan_id, e);
        return false;
    }

    match notifier.deliver(payload).await {
        Ok(()) => {
            debug!(
                "Sent {} notification for loan {} to {}",
                payload.kind, loan_id, payload.musician_email
            );
            true
        }
        Err(e) => {
            warn!(
                "Failed to send {} notification for loan {}: {}",
                payload.kind, loan_id, e
            );
            false
        }
    }
}
