//! Loan notification payloads and email templates

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::db::models::{required, Musician, Score};
use crate::Result;

/// Why a musician is being notified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Loan,
    Return,
    Reminder,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NotificationKind::Loan => "loan",
            NotificationKind::Return => "return",
            NotificationKind::Reminder => "reminder",
        })
    }
}

/// Payload accepted by the notification dispatch callable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub musician_email: String,
    pub musician_name: String,
    pub score_title: String,
    pub score_composer: String,
    pub score_part: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
}

impl NotificationPayload {
    pub fn new(kind: NotificationKind, musician: &Musician, score: &Score) -> Self {
        Self {
            musician_email: musician.email.clone(),
            musician_name: musician.full_name(),
            score_title: score.title.clone(),
            score_composer: score.composer.clone(),
            score_part: score.part.clone(),
            kind,
        }
    }

    /// A payload needs at least a recipient
    pub fn validate(&self) -> Result<()> {
        required("musician email", &self.musician_email)?;
        Ok(())
    }

    /// "Title - Composer (Part)"
    pub fn score_label(&self) -> String {
        format!("{} - {} ({})", self.score_title, self.score_composer, self.score_part)
    }

    /// Plain-text email for this payload
    pub fn render(&self, signature: &str) -> EmailMessage {
        let (subject, lead, closing) = match self.kind {
            NotificationKind::Loan => (
                "Sheet music loan confirmation",
                "This confirms that you have borrowed:",
                "Please remember to return the music when you no longer need it.",
            ),
            NotificationKind::Return => (
                "Sheet music return confirmation",
                "This confirms that you have returned:",
                "Thank you!",
            ),
            NotificationKind::Reminder => (
                "Reminder: please return your sheet music",
                "This is a reminder that you still have:",
                "Please return the music as soon as you can.",
            ),
        };

        let body = format!(
            "Hello {name},\n\n{lead}\n{title} - {composer}\nPart: {part}\n\n{closing}\n\nBest regards,\n{signature}",
            name = self.musician_name,
            title = self.score_title,
            composer = self.score_composer,
            part = self.score_part,
        );

        EmailMessage {
            to_email: self.musician_email.clone(),
            to_name: self.musician_name.clone(),
            subject: subject.to_string(),
            body,
        }
    }
}

/// Rendered email, independent of the delivery back-end
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to_email: String,
    pub to_name: String,
    pub subject: String,
    pub body: String,
}
