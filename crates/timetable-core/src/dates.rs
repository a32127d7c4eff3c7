//! Date arithmetic for school days.
//!
//! All functions work on local calendar dates (`NaiveDate`); the only clock
//! read happens in [`next_valid_date`], everything else is pure.

use std::fmt;

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TimetableError};

/// ISO-8601 week-numbering year and week, e.g. `2025-1`.
///
/// Used verbatim as the journal API path segment and as the per-resolve
/// cache key, so every date of one ISO week maps to the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IsoWeekKey {
    pub year: i32,
    pub week: u32,
}

impl IsoWeekKey {
    pub fn of(date: NaiveDate) -> Self {
        let iso = date.iso_week();
        Self {
            year: iso.year(),
            week: iso.week(),
        }
    }
}

impl fmt::Display for IsoWeekKey {
    // The API expects the week without zero padding: "2025-1", not "2025-01".
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.year, self.week)
    }
}

/// `YYYY-MM-DD`, independent of locale.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a `YYYY-MM-DD` string as produced by [`format_date`].
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| TimetableError::InvalidDate(format!("{s}: {e}")))
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// The date whose timetable should be shown right now.
pub fn next_valid_date(day_ends_at_hour: u32) -> NaiveDate {
    next_valid_date_at(Local::now().naive_local(), day_ends_at_hour)
}

/// Same as [`next_valid_date`] for an explicit local wall-clock time.
///
/// From `day_ends_at_hour` on, today is over and tomorrow is the candidate;
/// weekend days are then skipped.
pub fn next_valid_date_at(now: NaiveDateTime, day_ends_at_hour: u32) -> NaiveDate {
    let mut d = now.date();
    if now.hour() >= day_ends_at_hour {
        d += Duration::days(1);
    }
    while is_weekend(d) {
        d += Duration::days(1);
    }
    d
}

/// Whole calendar days from `from` to `to` (negative if `to` is earlier).
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}
