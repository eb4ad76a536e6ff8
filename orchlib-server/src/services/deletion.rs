//! Guarded batch deletion of musicians and scores
//!
//! The active-loan read, the guard decision and the deletes run in one
//! SQLite transaction. Any blocked id aborts the whole batch.

use orchlib_common::db::loans::list_active_loans_in;
use orchlib_common::db::musicians::{delete_musicians as delete_musician_rows, musicians_by_ids};
use orchlib_common::db::scores::{delete_scores as delete_score_rows, scores_by_ids};
use orchlib_common::guard::{check_deletable, normalize_selection};
use orchlib_common::Result;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{info, warn};

/// Result of a batch delete that passed the guard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeleteOutcome {
    pub requested: usize,
    /// Ids that no longer existed are not counted
    pub deleted: u64,
}

pub async fn delete_musicians(db: &SqlitePool, ids: &[String]) -> Result<DeleteOutcome> {
    let ids = normalize_selection(ids)?;

    let mut tx = db.begin().await?;
    let active = list_active_loans_in(&mut tx).await?;
    let known = musicians_by_ids(&mut tx, &ids).await?;
    if let Err(e) = check_deletable(&ids, &active, &known) {
        warn!("Musician delete blocked: {}", e);
        return Err(e);
    }

    let deleted = delete_musician_rows(&mut tx, &ids).await?;
    tx.commit().await?;

    info!("Deleted {} of {} selected musician(s)", deleted, ids.len());
    Ok(DeleteOutcome {
        requested: ids.len(),
        deleted,
    })
}

pub async fn delete_scores(db: &SqlitePool, ids: &[String]) -> Result<DeleteOutcome> {
    let ids = normalize_selection(ids)?;

    let mut tx = db.begin().await?;
    let active = list_active_loans_in(&mut tx).await?;
    let known = scores_by_ids(&mut tx, &ids).await?;
    if let Err(e) = check_deletable(&ids, &active, &known) {
        warn!("Score delete blocked: {}", e);
        return Err(e);
    }

    let deleted = delete_score_rows(&mut tx, &ids).await?;
    tx.commit().await?;

    info!("Deleted {} of {} selected score(s)", deleted, ids.len());
    Ok(DeleteOutcome {
        requested: ids.len(),
        deleted,
    })
}
