//! Manual trigger of the daily reminder job

use axum::{extract::State, Json};
use orchlib_common::time;

use crate::error::ApiResult;
use crate::services::{self, ReminderRunReport};
use crate::AppState;

/// POST /api/reminders/run
pub async fn run_reminders_now(State(state): State<AppState>) -> ApiResult<Json<ReminderRunReport>> {
    let report = services::run_reminders(&state.db, state.notifier.as_ref(), time::now()).await?;
    Ok(Json(report))
}
