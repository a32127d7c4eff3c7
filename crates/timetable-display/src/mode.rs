use serde::Serialize;

use crate::merge::MergedTimeTable;

/// What the board should show for a merged timetable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DisplayMode {
    /// Regular grid.
    Timetable,
    /// Long break ahead: show the number of free days instead of the grid.
    Countdown { days_off: u32 },
    /// Nothing found within the search bound.
    NoSchool,
}

impl DisplayMode {
    pub fn of(timetable: &MergedTimeTable, show_countdown_days: u32) -> Self {
        if timetable.is_empty() {
            return DisplayMode::NoSchool;
        }
        match timetable.days_off {
            Some(days_off) if days_off >= show_countdown_days => DisplayMode::Countdown { days_off },
            _ => DisplayMode::Timetable,
        }
    }

    /// Holiday styling applies to both the countdown and the empty board.
    pub fn is_holiday(&self) -> bool {
        !matches!(self, DisplayMode::Timetable)
    }
}

/// Page heading for the grid view.
pub fn heading(timetable: &MergedTimeTable) -> &'static str {
    if timetable.is_today {
        "Stundenplan"
    } else {
        "Nächster Stundenplan"
    }
}
