use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use timetable_core::dates::format_date;
use timetable_core::types::{Lesson, Note, Time, TimeTable};
use tracing::debug;

/// Dash-like characters guardians' notes use as list bullets.
const NOTE_BULLETS: [char; 3] = ['-', '–', '—'];

/// One hour of the grid: a slot per class, `None` where the class is free.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourRow {
    pub hour: u32,
    pub time: Option<Time>,
    pub subjects: Vec<Option<Lesson>>,
}

/// Display-ready timetable: classes as columns, hours 1..=last_hour as rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedTimeTable {
    /// `YYYY-MM-DD` of the shown day.
    pub date: String,
    pub is_today: bool,
    pub class_names: Vec<String>,
    pub hours: Vec<HourRow>,
    /// Note lines without bullets, blank lines dropped.
    pub notes: Vec<String>,
    /// Highest hour slot of any class; `None` for a table without classes.
    pub last_hour: Option<u32>,
    /// Local time of the merge, `dd.mm.yyyy, HH:MM`.
    pub updated: String,
    pub days_off: Option<u32>,
}

impl MergedTimeTable {
    /// Merge `timetable` as of the current local time.
    pub fn build(timetable: &TimeTable) -> Self {
        merge_timetable(timetable, Local::now().naive_local())
    }

    /// No classes at all: the resolver found no school day.
    pub fn is_empty(&self) -> bool {
        self.class_names.is_empty()
    }
}

pub fn merge_timetable(timetable: &TimeTable, now: NaiveDateTime) -> MergedTimeTable {
    let last_hour = timetable
        .classes
        .iter()
        .flat_map(|c| c.subjects.iter().map(|s| s.nr))
        .max();

    let class_names = timetable
        .classes
        .iter()
        .map(|c| c.class_name.clone())
        .collect();

    // every hour up to the last one gets a row, even if nobody has a lesson
    let hours = (1..=last_hour.unwrap_or(0))
        .map(|hour| HourRow {
            hour,
            time: timetable.times.get(&hour).cloned(),
            subjects: timetable
                .classes
                .iter()
                .map(|c| c.subjects.iter().find(|s| s.nr == hour).cloned())
                .collect(),
        })
        .collect::<Vec<HourRow>>();

    debug!(
        date = %timetable.date,
        classes = timetable.classes.len(),
        hours = hours.len(),
        "timetable merged into grid"
    );

    MergedTimeTable {
        date: format_date(timetable.date),
        is_today: timetable.date == now.date(),
        class_names,
        hours,
        notes: clean_notes(&timetable.notes),
        last_hour,
        updated: now.format("%d.%m.%Y, %H:%M").to_string(),
        days_off: timetable.days_off,
    }
}

/// Split note descriptions into lines, strip bullets and whitespace.
pub fn clean_notes(notes: &[Note]) -> Vec<String> {
    notes
        .iter()
        .flat_map(|n| n.description.lines())
        .map(|line| line.trim().trim_start_matches(NOTE_BULLETS).trim())
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}
