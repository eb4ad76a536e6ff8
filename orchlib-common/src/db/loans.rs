//! Loan documents
//!
//! Rows are checked against the status/return-date invariant when read.
//! The return transition is a conditional update so two concurrent
//! returns cannot both succeed.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};

use crate::db::models::{Loan, LoanStatus};
use crate::{Error, Result};

const SELECT_LOAN: &str = r#"
    SELECT id, musician_id, score_id, loan_date, return_date, status, notes,
           created_at, last_reminder_sent
    FROM loans
"#;

fn from_row(row: &SqliteRow) -> Result<Loan> {
    let status: String = row.try_get("status")?;
    let loan = Loan {
        id: row.try_get("id")?,
        musician_id: row.try_get("musician_id")?,
        score_id: row.try_get("score_id")?,
        loan_date: row.try_get("loan_date")?,
        return_date: row.try_get("return_date")?,
        status: status.parse()?,
        notes: row.try_get("notes")?,
        created_at: row.try_get("created_at")?,
        last_reminder_sent: row.try_get("last_reminder_sent")?,
    };
    loan.check_invariant()?;
    Ok(loan)
}

fn from_rows(rows: &[SqliteRow]) -> Result<Vec<Loan>> {
    rows.iter().map(from_row).collect()
}

pub async fn insert_loan(pool: &SqlitePool, loan: &Loan) -> Result<()> {
    loan.check_invariant()?;
    sqlx::query(
        r#"
        INSERT INTO loans (id, musician_id, score_id, loan_date, return_date, status, notes,
                           created_at, last_reminder_sent)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&loan.id)
    .bind(&loan.musician_id)
    .bind(&loan.score_id)
    .bind(loan.loan_date)
    .bind(loan.return_date)
    .bind(loan.status.as_str())
    .bind(&loan.notes)
    .bind(loan.created_at)
    .bind(loan.last_reminder_sent)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get_loan(pool: &SqlitePool, id: &str) -> Result<Option<Loan>> {
    let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_LOAN))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(from_row).transpose()
}

pub async fn list_loans(pool: &SqlitePool) -> Result<Vec<Loan>> {
    let rows = sqlx::query(SELECT_LOAN).fetch_all(pool).await?;
    from_rows(&rows)
}

pub async fn list_active_loans(pool: &SqlitePool) -> Result<Vec<Loan>> {
    let rows = sqlx::query(&format!("{} WHERE status = 'active'", SELECT_LOAN))
        .fetch_all(pool)
        .await?;
    from_rows(&rows)
}

/// Active loans as seen by a batch-delete transaction
pub async fn list_active_loans_in(tx: &mut Transaction<'_, Sqlite>) -> Result<Vec<Loan>> {
    let rows = sqlx::query(&format!("{} WHERE status = 'active'", SELECT_LOAN))
        .fetch_all(&mut **tx)
        .await?;
    from_rows(&rows)
}

/// Transition an active loan to returned.
///
/// NotFound if the loan does not exist, InvalidState if it is already
/// returned; in both cases nothing is written.
pub async fn mark_loan_returned(
    pool: &SqlitePool,
    id: &str,
    now: DateTime<Utc>,
) -> Result<Loan> {
    let updated = sqlx::query(
        "UPDATE loans SET status = ?, return_date = ? WHERE id = ? AND status = ?",
    )
    .bind(LoanStatus::Returned.as_str())
    .bind(now)
    .bind(id)
    .bind(LoanStatus::Active.as_str())
    .execute(pool)
    .await?
    .rows_affected();

    let loan = get_loan(pool, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Loan {} not found", id)))?;

    if updated == 0 {
        return Err(Error::InvalidState(format!("Loan {} is already returned", id)));
    }
    Ok(loan)
}

pub async fn record_reminder_sent(pool: &SqlitePool, id: &str, at: DateTime<Utc>) -> Result<()> {
    sqlx::query("UPDATE loans SET last_reminder_sent = ? WHERE id = ?")
        .bind(at)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
