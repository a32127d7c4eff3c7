use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use timetable_core::dates::{days_between, format_date, is_weekend, IsoWeekKey};
use timetable_core::types::{TimeTable, WeekJournal};
use tracing::{debug, info};

use crate::extract::{extract_day, DaySchedule};
use crate::source::{JournalSource, SourceError};

/// Finds the next date with published lessons, starting at a given day.
///
/// Schools publish nothing for holidays, so the resolver walks forward one
/// calendar day at a time (weekends are skipped without a request) for at
/// most `max_days_off` days and reports how many days it had to skip.
pub struct Resolver {
    source: Box<dyn JournalSource>,
    max_days_off: u32,
}

impl Resolver {
    pub fn new(source: Box<dyn JournalSource>, max_days_off: u32) -> Self {
        Self {
            source,
            max_days_off,
        }
    }

    pub fn max_days_off(&self) -> u32 {
        self.max_days_off
    }

    /// Resolve the timetable for `start` or the first later day with lessons.
    ///
    /// Fetch failures propagate unchanged; retrying is the caller's job. When
    /// nothing is found within the bound, the result is whatever `start`
    /// itself holds (usually an empty timetable) with `days_off` unset.
    pub async fn resolve(&self, token: &str, start: NaiveDate) -> Result<TimeTable, SourceError> {
        let mut weeks = WeekCache::new(self.source.as_ref(), token);
        let mut search = start;
        let mut days_checked = 0;

        while days_checked < self.max_days_off {
            if !is_weekend(search) {
                debug!(date = %format_date(search), "checking date");
                let day = extract_day(weeks.get(search).await?, search);
                if day.has_lessons() {
                    let skipped = days_between(start, search).max(0) as u32;
                    info!(
                        date = %format_date(search),
                        days_off = skipped,
                        source = self.source.name(),
                        "timetable resolved"
                    );
                    return Ok(into_timetable(day, search, Some(skipped).filter(|d| *d > 0)));
                }
            }
            search += Duration::days(1);
            days_checked += 1;
        }

        info!(
            start = %format_date(start),
            max_days_off = self.max_days_off,
            "no school day found, falling back to start date"
        );
        let day = extract_day(weeks.get(start).await?, start);
        Ok(into_timetable(day, start, None))
    }
}

fn into_timetable(day: DaySchedule, date: NaiveDate, days_off: Option<u32>) -> TimeTable {
    TimeTable {
        date,
        times: day.times,
        classes: day.classes,
        notes: day.notes,
        days_off,
    }
}

/// Week journals fetched during one `resolve` call, keyed by ISO week.
struct WeekCache<'a> {
    source: &'a dyn JournalSource,
    token: &'a str,
    weeks: HashMap<IsoWeekKey, WeekJournal>,
}

impl<'a> WeekCache<'a> {
    fn new(source: &'a dyn JournalSource, token: &'a str) -> Self {
        Self {
            source,
            token,
            weeks: HashMap::new(),
        }
    }

    async fn get(&mut self, date: NaiveDate) -> Result<&WeekJournal, SourceError> {
        let key = IsoWeekKey::of(date);
        if !self.weeks.contains_key(&key) {
            debug!(week = %key, "fetching week");
            let journal = self.source.fetch_week(self.token, key).await?;
            self.weeks.insert(key, journal);
        } else {
            debug!(week = %key, "week cache hit");
        }
        self.weeks
            .get(&key)
            .ok_or_else(|| SourceError::Unavailable(format!("week {key} missing from cache")))
    }
}
