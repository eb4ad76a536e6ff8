//! Notification dispatch endpoint

use axum::{extract::State, Extension, Json};
use orchlib_common::notification::NotificationPayload;

use crate::error::ApiResult;
use crate::services::{self, Caller, DispatchReport};
use crate::AppState;

/// POST /api/notifications
///
/// A failed delivery is answered with 502.
pub async fn send_notification(
    State(state): State<AppState>,
    caller: Option<Extension<Caller>>,
    Json(payload): Json<NotificationPayload>,
) -> ApiResult<Json<DispatchReport>> {
    let caller = caller
        .map(|Extension(c)| c)
        .unwrap_or(Caller { authenticated: false });
    let report =
        services::dispatch_notification(state.notifier.as_ref(), caller, &payload).await?;
    Ok(Json(report))
}
