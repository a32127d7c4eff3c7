use serde::Serialize;
use timetable_core::types::Lesson;

/// Text content of one grid cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LessonCell {
    pub label: String,
    /// `"Forename Name"` of every teacher, joined with `/`.
    pub teachers: String,
    /// Room codes joined with `/`; empty when no room is assigned.
    pub rooms: String,
    pub canceled: bool,
}

impl LessonCell {
    pub fn new(lesson: &Lesson, label_max_chars: usize) -> Self {
        Self {
            label: subject_label(lesson, label_max_chars).to_string(),
            teachers: lesson
                .teachers
                .iter()
                .map(|t| format!("{} {}", t.forename, t.name).trim().to_string())
                .collect::<Vec<_>>()
                .join("/"),
            rooms: lesson
                .rooms
                .iter()
                .map(|r| r.local_id.as_str())
                .collect::<Vec<_>>()
                .join("/"),
            canceled: lesson.is_canceled(),
        }
    }
}

/// The subject's display name if it is short enough, else its short code.
pub fn subject_label(lesson: &Lesson, max_chars: usize) -> &str {
    match lesson.subject.name.as_deref() {
        Some(name) if !name.is_empty() && name.chars().count() < max_chars => name,
        _ => lesson.subject.local_id.as_str(),
    }
}
