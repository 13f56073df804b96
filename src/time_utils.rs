// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-roster authors

//! Calendar arithmetic shared by renewals, analytics and the expiry scan.
//!
//! All boundaries are computed in UTC.

use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveTime, TimeDelta, Utc};

/// Advance `date` by `months` calendar months.
///
/// The day of month is clamped to the length of the target month, so
/// Jan 31 + 1 month lands on the last day of February. Returns `None` if the
/// result is out of range.
pub fn add_months(date: DateTime<Utc>, months: u32) -> Option<DateTime<Utc>> {
    date.checked_add_months(Months::new(months))
}

/// First instant of the day containing `date`.
pub fn start_of_day(date: DateTime<Utc>) -> DateTime<Utc> {
    date.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Last instant of the day containing `date`.
pub fn end_of_day(date: DateTime<Utc>) -> DateTime<Utc> {
    start_of_day(date) + TimeDelta::days(1) - TimeDelta::nanoseconds(1)
}

/// First instant of the month containing `date`.
pub fn start_of_month(date: DateTime<Utc>) -> DateTime<Utc> {
    // Day 1 always exists.
    let first = NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date.date_naive());
    first.and_time(NaiveTime::MIN).and_utc()
}

/// Last instant of the month containing `date`.
pub fn end_of_month(date: DateTime<Utc>) -> DateTime<Utc> {
    let start = start_of_month(date);
    match start.checked_add_months(Months::new(1)) {
        Some(next) => next - TimeDelta::nanoseconds(1),
        None => DateTime::<Utc>::MAX_UTC,
    }
}

/// Start of the month `months` before the month containing `date`.
pub fn months_back(date: DateTime<Utc>, months: u32) -> Option<DateTime<Utc>> {
    start_of_month(date).checked_sub_months(Months::new(months))
}

/// Short English month name ("Jan", "Feb", ...).
pub fn month_label(date: DateTime<Utc>) -> String {
    date.format("%b").to_string()
}
