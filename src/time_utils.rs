// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time handling.

use chrono::{DateTime, Datelike, Duration, NaiveDate, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Midnight UTC at the start of `day`.
pub fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    day.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Monday of the week containing `day`, or `None` at the edge of the
/// representable calendar.
pub fn week_start(day: NaiveDate) -> Option<NaiveDate> {
    day.checked_sub_signed(Duration::days(
        day.weekday().num_days_from_monday() as i64,
    ))
}

/// `[start, end)` bounds of the Monday-based week containing `day`.
pub fn week_bounds(day: NaiveDate) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = start_of_day(week_start(day)?);
    Some((start, start.checked_add_signed(Duration::days(7))?))
}

/// `[start, end)` bounds of the UTC calendar `day`.
pub fn day_bounds(day: NaiveDate) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = start_of_day(day);
    Some((start, start.checked_add_signed(Duration::days(1))?))
}
