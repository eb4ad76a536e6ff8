//! Loan lifecycle
//!
//! `active -> returned` is the only transition. There is no reopen; a
//! musician borrowing the same part again gets a new loan.

use chrono::{DateTime, Utc};

use crate::db::models::{optional, Loan, LoanStatus};
use crate::{uuid_utils, Error, Result};

impl Loan {
    /// Open a new active loan dated `now`.
    ///
    /// Fails with a ValidationError when either reference is blank.
    pub fn open(
        musician_id: &str,
        score_id: &str,
        notes: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Loan> {
        let musician_id = musician_id.trim();
        let score_id = score_id.trim();
        if musician_id.is_empty() || score_id.is_empty() {
            return Err(Error::Validation(
                "Select a musician and a score before creating a loan".to_string(),
            ));
        }

        Ok(Loan {
            id: uuid_utils::new_id(),
            musician_id: musician_id.to_string(),
            score_id: score_id.to_string(),
            loan_date: now,
            return_date: None,
            status: LoanStatus::Active,
            notes: optional(notes),
            created_at: now,
            last_reminder_sent: None,
        })
    }

    pub fn is_active(&self) -> bool {
        self.status == LoanStatus::Active
    }

    /// Mark the loan returned at `now`.
    ///
    /// A loan that is already returned is left untouched and an
    /// InvalidState error is returned.
    pub fn mark_returned(&mut self, now: DateTime<Utc>) -> Result<()> {
        if !self.is_active() {
            return Err(Error::InvalidState(format!(
                "Loan {} is already returned",
                self.id
            )));
        }
        self.status = LoanStatus::Returned;
        self.return_date = Some(now);
        Ok(())
    }

    /// `status == active` iff `return_date` is absent
    pub fn check_invariant(&self) -> Result<()> {
        match (self.status, self.return_date) {
            (LoanStatus::Active, None) | (LoanStatus::Returned, Some(_)) => Ok(()),
            (status, return_date) => Err(Error::Internal(format!(
                "Loan {} has status {} but return date {:?}",
                self.id, status, return_date
            ))),
        }
    }
}
