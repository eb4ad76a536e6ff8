//! Library documents: musicians, score parts, loans and app settings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// A member of the orchestra who can borrow parts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Musician {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    /// Free text, e.g. "Trumpet"
    pub instrument: String,
    pub created_at: DateTime<Utc>,
}

impl Musician {
    /// "First Last", used in notifications and guard messages
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// One printed part of one musical work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    pub id: String,
    pub title: String,
    pub composer: String,
    /// Instrument/voicing label, e.g. "Trumpet II"
    pub part: String,
    pub catalog_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Score {
    /// "Title - Composer (Part)"
    pub fn label(&self) -> String {
        format!("{} - {} ({})", self.title, self.composer, self.part)
    }
}

/// Loan status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Active,
    Returned,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Active => "active",
            LoanStatus::Returned => "returned",
        }
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoanStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "active" => Ok(LoanStatus::Active),
            "returned" => Ok(LoanStatus::Returned),
            other => Err(Error::Internal(format!("Unknown loan status '{}'", other))),
        }
    }
}

/// A score part lent to a musician.
///
/// `return_date` is `None` exactly when `status` is `Active`. Construct
/// through [`Loan::open`] and transition through [`Loan::mark_returned`];
/// rows read back from the store are checked with [`Loan::check_invariant`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    pub id: String,
    pub musician_id: String,
    pub score_id: String,
    pub loan_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub status: LoanStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_reminder_sent: Option<DateTime<Utc>>,
}

/// Singleton runtime settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub email_enabled: bool,
    pub reminder_interval_days: u32,
}

impl AppSettings {
    pub const DEFAULT_REMINDER_INTERVAL_DAYS: u32 = 7;

    /// Reject an interval below one day
    pub fn validate(&self) -> Result<()> {
        if self.reminder_interval_days < 1 {
            return Err(Error::Validation(
                "Reminder interval must be at least 1 day".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            email_enabled: true,
            reminder_interval_days: Self::DEFAULT_REMINDER_INTERVAL_DAYS,
        }
    }
}

/// Musician form contents (create and update)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MusicianInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub instrument: String,
}

impl MusicianInput {
    /// Trim fields and enforce the required ones
    pub fn normalized(&self) -> Result<MusicianInput> {
        let email = required("email", &self.email)?;
        if !email.contains('@') {
            return Err(Error::Validation(format!("'{}' is not an email address", email)));
        }
        Ok(MusicianInput {
            first_name: required("first name", &self.first_name)?,
            last_name: required("last name", &self.last_name)?,
            email,
            phone: optional(self.phone.as_deref()),
            instrument: required("instrument", &self.instrument)?,
        })
    }
}

/// Bulk score form: one Score is created per selected part
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewScores {
    pub title: String,
    pub composer: String,
    #[serde(default)]
    pub catalog_number: Option<String>,
    pub parts: Vec<String>,
}

/// Single score edit
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreInput {
    pub title: String,
    pub composer: String,
    pub part: String,
    #[serde(default)]
    pub catalog_number: Option<String>,
}

impl ScoreInput {
    pub fn normalized(&self) -> Result<ScoreInput> {
        Ok(ScoreInput {
            title: required("title", &self.title)?,
            composer: required("composer", &self.composer)?,
            part: required("part", &self.part)?,
            catalog_number: optional(self.catalog_number.as_deref()),
        })
    }
}

/// Trimmed value of a required field, or a ValidationError naming it
pub fn required(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

/// Trimmed optional value; blank becomes `None`
pub fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
