//! Timestamp utilities

use chrono::{DateTime, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Whole days elapsed from `start` to `now`, rounded toward negative infinity
pub fn whole_days_between(start: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;
    (now - start).num_milliseconds().div_euclid(MILLIS_PER_DAY)
}
