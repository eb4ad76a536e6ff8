//! Loan creation and return
//!
//! The store write happens first; the confirmation email is sent after it
//! and its outcome is only logged.

use chrono::{DateTime, Utc};
use orchlib_common::db::loans::{insert_loan, mark_loan_returned};
use orchlib_common::db::models::Loan;
use orchlib_common::db::musicians::get_musician;
use orchlib_common::db::scores::get_score;
use orchlib_common::db::settings::load_app_settings;
use orchlib_common::notification::{NotificationKind, NotificationPayload};
use orchlib_common::{Error, Result};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::notify::{notify_best_effort, Notifier};

/// Loan form contents
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLoan {
    #[serde(default)]
    pub musician_id: String,
    #[serde(default)]
    pub score_id: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Open a loan and send the loan confirmation.
///
/// ValidationError for a blank selection, NotFound when the musician or
/// score does not exist.
pub async fn create_loan(
    db: &SqlitePool,
    notifier: &dyn Notifier,
    new: &NewLoan,
    now: DateTime<Utc>,
) -> Result<Loan> {
    let loan = Loan::open(&new.musician_id, &new.score_id, new.notes.as_deref(), now)?;

    if get_musician(db, &loan.musician_id).await?.is_none() {
        return Err(Error::NotFound(format!("Musician {} not found", loan.musician_id)));
    }
    if get_score(db, &loan.score_id).await?.is_none() {
        return Err(Error::NotFound(format!("Score {} not found", loan.score_id)));
    }

    insert_loan(db, &loan).await?;
    info!(
        "Loan {} opened: musician {} score {}",
        loan.id, loan.musician_id, loan.score_id
    );

    send_confirmation(db, notifier, &loan, NotificationKind::Loan).await;
    Ok(loan)
}

/// Return an active loan and send the return confirmation.
///
/// NotFound for an unknown id, InvalidState when already returned.
pub async fn return_loan(
    db: &SqlitePool,
    notifier: &dyn Notifier,
    loan_id: &str,
    now: DateTime<Utc>,
) -> Result<Loan> {
    let loan = mark_loan_returned(db, loan_id, now).await?;
    info!("Loan {} returned", loan.id);

    send_confirmation(db, notifier, &loan, NotificationKind::Return).await;
    Ok(loan)
}

/// Best-effort confirmation, gated on `emailEnabled`
async fn send_confirmation(
    db: &SqlitePool,
    notifier: &dyn Notifier,
    loan: &Loan,
    kind: NotificationKind,
) {
    let settings = match load_app_settings(db).await {
        Ok(settings) => settings,
        Err(e) => {
            warn!("Not sending {} notification for loan {}: {}", kind, loan.id, e);
            return;
        }
    };
    if !settings.email_enabled {
        return;
    }

    let (musician, score) = match (
        get_musician(db, &loan.musician_id).await,
        get_score(db, &loan.score_id).await,
    ) {
        (Ok(Some(m)), Ok(Some(s))) => (m, s),
        (Err(e), _) | (_, Err(e)) => {
            warn!("Not sending {} notification for loan {}: {}", kind, loan.id, e);
            return;
        }
        _ => {
            warn!(
                "Not sending {} notification for loan {}: musician or score no longer exists",
                kind, loan.id
            );
            return;
        }
    };

    let payload = NotificationPayload::new(kind, &musician, &score);
    notify_best_effort(notifier, &payload, &loan.id).await;
}
