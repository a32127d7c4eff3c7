//! Journal wire format and the resolved timetable.
//!
//! The journal API sends `null` for many fields it considers unset, so most
//! scalars decode through [`null_as_default`] and are validated later.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

fn null_as_default<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(de)?.unwrap_or_default())
}

/// Hour slots and level ids: anything but a positive integer (or a numeric
/// string) becomes `0`, which extraction treats as missing.
fn slot_number<'de, D>(de: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(de)?;
    let slot = match value {
        Some(serde_json::Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    Ok(slot.unwrap_or(0))
}

/// Reply of `GET journal/weeks/{year}-{week}?include=days.lessons`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeekJournal {
    #[serde(default)]
    pub data: WeekData,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeekData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub days: Vec<Day>,
}

/// One calendar date of a week journal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Day {
    /// `YYYY-MM-DD`
    pub date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub lessons: Vec<Lesson>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub notes: Vec<Note>,
}

/// Free-text note attached to a day, addressed to guardians.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Note {
    #[serde(rename = "for", default, deserialize_with = "null_as_default")]
    pub audience: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub source: String,
    /// May span several lines, often as a dash-prefixed list.
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default)]
    pub notable_type: Option<String>,
}

/// One scheduled class period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    #[serde(default)]
    pub id: Option<i64>,
    /// 1-based hour slot; `0` marks a lesson the API sent without a usable slot.
    #[serde(default, deserialize_with = "slot_number")]
    pub nr: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub group: Group,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subject: Subject,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: LessonStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rooms: Vec<Room>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub teachers: Vec<Teacher>,
    #[serde(default)]
    pub time: Option<Time>,
}

impl Lesson {
    pub fn is_canceled(&self) -> bool {
        self.status == LessonStatus::Canceled
    }
}

/// A class section as the API models it; several groups share one level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Group {
    #[serde(default)]
    pub id: Option<i64>,
    /// Section code such as `"10a"`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub local_id: String,
    /// Grade/cohort the section belongs to; `0` when missing.
    #[serde(default, deserialize_with = "slot_number")]
    pub level_id: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    #[serde(default)]
    pub id: Option<i64>,
    /// Short code, e.g. `"M"` or `"Deu"`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub local_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Room {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub local_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Teacher {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub local_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub forename: String,
    /// Surname.
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

/// Start and end of an hour slot, e.g. `nr = 1, from = "07:45", to = "08:30"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Time {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "slot_number")]
    pub nr: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub from: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub to: String,
}

/// Lesson status with the API's literal spelling (`"canceled"`, one `l`).
///
/// Unknown values are kept verbatim instead of failing the whole week.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LessonStatus {
    #[default]
    Initial,
    Canceled,
    Hold,
    Planned,
    Other(String),
}

impl LessonStatus {
    pub fn as_str(&self) -> &str {
        match self {
            LessonStatus::Initial => "initial",
            LessonStatus::Canceled => "canceled",
            LessonStatus::Hold => "hold",
            LessonStatus::Planned => "planned",
            LessonStatus::Other(s) => s,
        }
    }
}

impl From<String> for LessonStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "initial" => LessonStatus::Initial,
            "canceled" => LessonStatus::Canceled,
            "hold" => LessonStatus::Hold,
            "planned" => LessonStatus::Planned,
            _ => LessonStatus::Other(s),
        }
    }
}

impl From<LessonStatus> for String {
    fn from(status: LessonStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for LessonStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// All lessons of one level on one day, ordered by hour slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectList {
    pub level_id: u32,
    /// Longest common prefix of every group code seen at this level.
    pub class_name: String,
    pub subjects: Vec<Lesson>,
}

/// A resolved school day, ready to be merged into the display grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeTable {
    /// The date the lessons belong to.
    pub date: NaiveDate,
    /// Hour slot → time of day; first lesson seen for a slot wins.
    pub times: BTreeMap<u32, Time>,
    pub classes: Vec<SubjectList>,
    pub notes: Vec<Note>,
    /// Calendar days skipped to reach `date`; `None` when `date` is the
    /// requested day.
    pub days_off: Option<u32>,
}

impl TimeTable {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            times: BTreeMap::new(),
            classes: Vec::new(),
            notes: Vec::new(),
            days_off: None,
        }
    }

    pub fn has_lessons(&self) -> bool {
        self.classes.iter().any(|c| !c.subjects.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_keeps_wire_spelling() {
        let s: LessonStatus = serde_json::from_str(r#""canceled""#).unwrap();
        assert_eq!(s, LessonStatus::Canceled);
        assert_eq!(serde_json::to_string(&s).unwrap(), r#""canceled""#);

        // the double-l spelling is not what the API sends
        let other: LessonStatus = serde_json::from_str(r#""cancelled""#).unwrap();
        assert_eq!(other, LessonStatus::Other("cancelled".to_string()));
    }

    #[test]
    fn lesson_tolerates_nulls() {
        let json = r#"{
            "id": 7, "nr": null,
            "group": {"id": null, "local_id": "5a", "level_id": null},
            "subject": {"id": 1, "local_id": "M", "name": null, "tags": null},
            "status": null, "rooms": null, "teachers": null, "time": null
        }"#;
        let lesson: Lesson = serde_json::from_str(json).unwrap();
        assert_eq!(lesson.nr, 0);
        assert_eq!(lesson.group.level_id, 0);
        assert_eq!(lesson.status, LessonStatus::Initial);
        assert!(lesson.subject.name.is_none());
        assert!(lesson.rooms.is_empty());
        assert!(lesson.time.is_none());
    }

    #[test]
    fn malformed_slot_numbers_decode_as_missing() {
        let nr_of = |raw: &str| -> u32 {
            let json = format!(r#"{{"nr": {raw}, "group": {{"local_id": "5a", "level_id": 5}}}}"#);
            serde_json::from_str::<Lesson>(&json).unwrap().nr
        };
        assert_eq!(nr_of("-1"), 0);
        assert_eq!(nr_of("2.5"), 0);
        assert_eq!(nr_of("\"x\""), 0);
        assert_eq!(nr_of("[]"), 0);
        assert_eq!(nr_of("\"3\""), 3);
        assert_eq!(nr_of("4"), 4);
        assert_eq!(nr_of("4294967296"), 0);
    }

    #[test]
    fn week_with_negative_slot_still_decodes() {
        let json = r#"{"data": {"days": [{"date": "2025-01-06", "lessons": [
            {"nr": -2, "group": {"local_id": "5a", "level_id": 5}},
            {"nr": 1, "group": {"local_id": "5a", "level_id": -5},
             "time": {"nr": -1, "from": "07:45", "to": "08:30"}},
            {"nr": 2, "group": {"local_id": "5a", "level_id": 5}}
        ]}]}}"#;
        let week: WeekJournal = serde_json::from_str(json).unwrap();
        let nrs: Vec<u32> = week.data.days[0].lessons.iter().map(|l| l.nr).collect();
        assert_eq!(nrs, vec![0, 1, 2]);
        assert_eq!(week.data.days[0].lessons[1].group.level_id, 0);
        assert_eq!(week.data.days[0].lessons[1].time.as_ref().unwrap().nr, 0);
    }

    #[test]
    fn empty_timetable_has_no_lessons() {
        let tt = TimeTable::empty(NaiveDate::from_ymd_opt(2025, 1, 6).unwrap());
        assert!(!tt.has_lessons());
        assert!(tt.days_off.is_none());
    }
}
