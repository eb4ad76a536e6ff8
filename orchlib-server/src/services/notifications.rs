//! Notification dispatch callable

use orchlib_common::notification::NotificationPayload;
use orchlib_common::{Error, Result};
use serde::Serialize;
use tracing::info;

use crate::notify::Notifier;

/// Who is calling a privileged operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub authenticated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub success: bool,
    pub message: String,
}

/// Deliver one notification on behalf of an authenticated caller.
///
/// Unlike the best-effort path used by loan operations, a delivery
/// failure is returned to the caller as `Error::Delivery`.
pub async fn dispatch_notification(
    notifier: &dyn Notifier,
    caller: Caller,
    payload: &NotificationPayload,
) -> Result<DispatchReport> {
    if !caller.authenticated {
        return Err(Error::Unauthenticated);
    }
    payload.validate()?;

    notifier.deliver(payload).await?;
    info!("Dispatched {} notification to {}", payload.kind, payload.musician_email);

    Ok(DispatchReport {
        success: true,
        message: format!("Sent {} notification to {}", payload.kind, payload.musician_email),
    })
}
