//! Reminder schedule
//!
//! An active loan gets a reminder on day N, 2N, 3N, ... after it was
//! opened, where N is the configured reminder interval. Reminders keep
//! firing every interval until the loan is returned.

use chrono::{DateTime, Utc};

use crate::db::models::{AppSettings, Loan};
use crate::time::whole_days_between;

/// Whether a loan aged `days_since_loan` whole days is due a reminder
pub fn reminder_due(days_since_loan: i64, interval_days: u32) -> bool {
    let interval = i64::from(interval_days);
    interval >= 1 && days_since_loan >= interval && days_since_loan % interval == 0
}

/// A loan selected by the daily run
#[derive(Debug, Clone, PartialEq)]
pub struct DueReminder<'a> {
    pub loan: &'a Loan,
    pub days_since_loan: i64,
}

/// Active loans due a reminder at `now`; nothing when email is disabled
pub fn select_due<'a>(
    loans: &'a [Loan],
    settings: &AppSettings,
    now: DateTime<Utc>,
) -> Vec<DueReminder<'a>> {
    if !settings.email_enabled {
        return Vec::new();
    }
    loans
        .iter()
        .filter(|loan| loan.is_active())
        .filter_map(|loan| {
            let days_since_loan = whole_days_between(loan.loan_date, now);
            reminder_due(days_since_loan, settings.reminder_interval_days).then_some(DueReminder {
                loan,
                days_since_loan,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn settings(interval: u32) -> AppSettings {
        AppSettings {
            email_enabled: true,
            reminder_interval_days: interval,
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 10, 8, 0, 0).unwrap()
    }

    #[test]
    fn weekly_interval_fires_on_multiples_of_seven() {
        assert!(!reminder_due(0, 7));
        assert!(!reminder_due(6, 7));
        assert!(reminder_due(7, 7));
        assert!(!reminder_due(8, 7));
        assert!(!reminder_due(13, 7));
        assert!(reminder_due(14, 7));
        assert!(reminder_due(70, 7));
    }

    #[test]
    fn daily_interval_fires_every_day_after_the_first() {
        assert!(!reminder_due(0, 1));
        assert!(reminder_due(1, 1));
        assert!(reminder_due(2, 1));
    }

    #[test]
    fn degenerate_inputs_never_fire() {
        assert!(!reminder_due(7, 0));
        assert!(!reminder_due(-7, 7));
    }

    #[test]
    fn loan_selected_at_seven_days_not_at_eight() {
        let loan = Loan::open("m1", "s1", None, t0()).unwrap();
        let loans = vec![loan];

        let at_seven = select_due(&loans, &settings(7), t0() + Duration::days(7));
        assert_eq!(at_seven.len(), 1);
        assert_eq!(at_seven[0].days_since_loan, 7);

        let at_eight = select_due(&loans, &settings(7), t0() + Duration::days(8));
        assert!(at_eight.is_empty());
    }

    #[test]
    fn partial_day_counts_as_previous_day() {
        let loans = vec![Loan::open("m1", "s1", None, t0()).unwrap()];
        let just_before = t0() + Duration::days(7) - Duration::minutes(1);
        assert!(select_due(&loans, &settings(7), just_before).is_empty());
    }

    #[test]
    fn returned_loans_are_skipped() {
        let mut loan = Loan::open("m1", "s1", None, t0()).unwrap();
        loan.mark_returned(t0() + Duration::days(1)).unwrap();
        let loans = vec![loan];
        assert!(select_due(&loans, &settings(7), t0() + Duration::days(7)).is_empty());
    }

    #[test]
    fn disabled_email_selects_nothing() {
        let loans = vec![Loan::open("m1", "s1", None, t0()).unwrap()];
        let off = AppSettings {
            email_enabled: false,
            reminder_interval_days: 7,
        };
        assert!(select_due(&loans, &off, t0() + Duration::days(7)).is_empty());
    }
}
