//! Broadcast date math.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Next date (today inclusive) that falls on the target weekday.
pub fn next_weekday(today: NaiveDate, target: Weekday) -> NaiveDate {
    let days_ahead = (7 + target.num_days_from_monday() as i64
        - today.weekday().num_days_from_monday() as i64)
        % 7;
    today + Duration::days(days_ahead)
}

/// Days from `today` until the next target weekday (0 when today matches).
pub fn days_until(today: NaiveDate, target: Weekday) -> i64 {
    (next_weekday(today, target) - today).num_days()
}

/// Parse the catalog's lowercase broadcast day names ("monday", ...).
pub fn parse_weekday(day: &str) -> Option<Weekday> {
    day.parse::<Weekday>().ok()
}
