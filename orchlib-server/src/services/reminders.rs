//! Daily reminder run
//!
//! Failures are isolated per loan: a delivery or bookkeeping error is
//! logged and the run moves on to the next loan.

use chrono::{DateTime, Utc};
use orchlib_common::db::loans::{list_active_loans, record_reminder_sent};
use orchlib_common::db::musicians::list_musicians;
use orchlib_common::db::scores::list_scores;
use orchlib_common::db::settings::load_app_settings;
use orchlib_common::notification::{NotificationKind, NotificationPayload};
use orchlib_common::reminders::select_due;
use orchlib_common::Result;
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::notify::{notify_best_effort, Notifier};

/// Counters for one reminder run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderRunReport {
    pub email_enabled: bool,
    pub active_loans: usize,
    pub due: usize,
    pub sent: usize,
    pub failed: usize,
    /// Due loans whose musician or score no longer exists
    pub skipped: usize,
}

/// Send reminders for every active loan due at `now`
pub async fn run_reminders(
    db: &SqlitePool,
    notifier: &dyn Notifier,
    now: DateTime<Utc>,
) -> Result<ReminderRunReport> {
    let settings = load_app_settings(db).await?;
    let mut report = ReminderRunReport {
        email_enabled: settings.email_enabled,
        ..ReminderRunReport::default()
    };

    if !settings.email_enabled {
        info!("Reminder run skipped: email notifications are disabled");
        return Ok(report);
    }

    let active = list_active_loans(db).await?;
    report.active_loans = active.len();

    let due = select_due(&active, &settings, now);
    report.due = due.len();
    if due.is_empty() {
        info!("Reminder run: no reminders due among {} active loan(s)", active.len());
        return Ok(report);
    }

    let musicians = list_musicians(db).await?;
    let scores = list_scores(db).await?;
    let musicians: HashMap<&str, _> = musicians.iter().map(|m| (m.id.as_str(), m)).collect();
    let scores: HashMap<&str, _> = scores.iter().map(|s| (s.id.as_str(), s)).collect();

    for reminder in due {
        let loan = reminder.loan;
        let (Some(musician), Some(score)) = (
            musicians.get(loan.musician_id.as_str()),
            scores.get(loan.score_id.as_str()),
        ) else {
            debug!("Loan {} references a deleted musician or score; no reminder", loan.id);
            report.skipped += 1;
            continue;
        };

        let payload = NotificationPayload::new(NotificationKind::Reminder, musician, score);
        if notify_best_effort(notifier, &payload, &loan.id).await {
            report.sent += 1;
        } else {
            report.failed += 1;
        }

        if let Err(e) = record_reminder_sent(db, &loan.id, now).await {
            warn!("Failed to record reminder for loan {}: {}", loan.id, e);
        }
    }

    info!(
        "Reminder run: {} due, {} sent, {} failed, {} skipped",
        report.due, report.sent, report.failed, report.skipped
    );
    Ok(report)
}
