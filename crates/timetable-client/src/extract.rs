use std::collections::BTreeMap;

use chrono::NaiveDate;
use timetable_core::dates::format_date;
use timetable_core::types::{Lesson, Note, SubjectList, Time, WeekJournal};
use tracing::{debug, warn};

/// Lessons, notes and hour times of a single date, grouped by level.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DaySchedule {
    pub times: BTreeMap<u32, Time>,
    /// One entry per level, ordered by level id.
    pub classes: Vec<SubjectList>,
    pub notes: Vec<Note>,
}

impl DaySchedule {
    pub fn has_lessons(&self) -> bool {
        self.classes.iter().any(|c| !c.subjects.is_empty())
    }
}

/// Pick `date` out of a week journal and group its lessons by level.
///
/// Lessons without an hour slot or level are skipped, as are later lessons
/// for a slot the level already has. Each level's display
/// name is the common prefix of all its group codes, so `10a` and `10b`
/// become one column named `10`.
pub fn extract_day(week: &WeekJournal, date: NaiveDate) -> DaySchedule {
    let date_str = format_date(date);
    let mut lessons_by_level: BTreeMap<u32, Vec<Lesson>> = BTreeMap::new();
    let mut names_by_level: BTreeMap<u32, String> = BTreeMap::new();
    let mut times: BTreeMap<u32, Time> = BTreeMap::new();
    let mut notes: Vec<Note> = Vec::new();

    for day in week.data.days.iter().filter(|d| d.date == date_str) {
        notes = day.notes.clone();

        for lesson in &day.lessons {
            if lesson.nr == 0 || lesson.group.level_id == 0 {
                warn!(
                    date = %date_str,
                    lesson_id = ?lesson.id,
                    nr = lesson.nr,
                    level_id = lesson.group.level_id,
                    "skipping lesson without hour slot or level"
                );
                continue;
            }

            let level = lesson.group.level_id;
            names_by_level
                .entry(level)
                .and_modify(|name| *name = common_prefix(name, &lesson.group.local_id))
                .or_insert_with(|| lesson.group.local_id.clone());

            // one lesson per hour slot and level; the first one seen is shown
            let subjects = lessons_by_level.entry(level).or_default();
            if subjects.iter().any(|l| l.nr == lesson.nr) {
                debug!(
                    date = %date_str,
                    level_id = level,
                    nr = lesson.nr,
                    group = %lesson.group.local_id,
                    "hour slot already taken at this level, dropping lesson"
                );
            } else {
                subjects.push(lesson.clone());
            }

            if let Some(time) = &lesson.time {
                times.entry(lesson.nr).or_insert_with(|| time.clone());
            }
        }
    }

    let classes = lessons_by_level
        .into_iter()
        .map(|(level_id, mut subjects)| {
            subjects.sort_by_key(|l| l.nr);
            SubjectList {
                level_id,
                class_name: names_by_level.remove(&level_id).unwrap_or_default(),
                subjects,
            }
        })
        .collect();

    DaySchedule {
        times,
        classes,
        notes,
    }
}

/// Longest common prefix of two group codes, compared per character.
pub fn common_prefix(a: &str, b: &str) -> String {
    a.chars()
        .zip(b.chars())
        .take_while(|(x, y)| x == y)
        .map(|(x, _)| x)
        .collect()
}
