//! Daily reminder trigger
//!
//! Sleeps until the next local `run_at` time, runs the reminder job and
//! repeats. A failed run is logged; the loop keeps going.

use chrono::{DateTime, Duration, Local, NaiveTime, TimeZone};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{error, info};

use crate::notify::Notifier;
use crate::services::run_reminders;

/// Next instant at or after `now` whose local wall-clock time is `run_at`.
///
/// A run_at that falls in a DST gap moves to the next day that has it.
pub fn next_run_after<Tz: TimeZone>(now: &DateTime<Tz>, run_at: NaiveTime) -> DateTime<Tz> {
    let tz = now.timezone();
    let mut date = now.date_naive();
    loop {
        if let Some(candidate) = tz.from_local_datetime(&date.and_time(run_at)).earliest() {
            if candidate > *now {
                return candidate;
            }
        }
        date = date.succ_opt().unwrap_or(date + Duration::days(1));
    }
}

/// Run the reminder job every day at `run_at` local time, forever
pub async fn run_daily(db: SqlitePool, notifier: Arc<dyn Notifier>, run_at: NaiveTime) {
    loop {
        let now = Local::now();
        let next = next_run_after(&now, run_at);
        let wait = (next - now).to_std().unwrap_or_default();
        info!("Next reminder run at {}", next.format("%Y-%m-%d %H:%M"));

        tokio::time::sleep(wait).await;

        match run_reminders(&db, notifier.as_ref(), orchlib_common::time::now()).await {
            Ok(report) => info!("Scheduled reminder run finished: {} sent", report.sent),
            Err(e) => error!("Scheduled reminder run failed: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn later_today() {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 6, 0, 0).unwrap();
        let next = next_run_after(&now, at(8, 0));
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 3, 5, 8, 0, 0).unwrap());
    }

    #[test]
    fn already_passed_rolls_to_tomorrow() {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 8, 0, 0).unwrap();
        let next = next_run_after(&now, at(8, 0));
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 3, 6, 8, 0, 0).unwrap());
    }

    #[test]
    fn uses_local_wall_clock() {
        let warsaw = FixedOffset::east_opt(3600).unwrap();
        let now = warsaw.with_ymd_and_hms(2024, 12, 31, 23, 30, 0).unwrap();
        let next = next_run_after(&now, at(8, 0));
        assert_eq!(next, warsaw.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap());
        assert_eq!(next.with_timezone(&Utc).format("%H:%M").to_string(), "07:00");
    }
}
