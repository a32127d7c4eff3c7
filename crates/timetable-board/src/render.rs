//! Plain-text rendering of the board for a terminal.

use timetable_core::config::DisplayConfig;
use timetable_core::dates::parse_date;
use timetable_display::mode::heading;
use timetable_display::{DisplayMode, LessonCell, MergedTimeTable};

use crate::session::Session;

const COLUMN_GAP: &str = " | ";

/// Render the whole board: heading, grid or holiday banner, notes, footer.
pub fn render_board(session: &Session, display: &DisplayConfig) -> String {
    let mut out = String::new();

    if let Some(tt) = session.timetable() {
        match DisplayMode::of(tt, display.show_countdown_days) {
            DisplayMode::Timetable => render_timetable(&mut out, tt, display.subject_label_max_chars),
            DisplayMode::Countdown { days_off } => render_holidays(&mut out, Some(days_off)),
            DisplayMode::NoSchool => render_holidays(&mut out, None),
        }
    }

    out.push('\n');
    if let Some(tt) = session.timetable() {
        out.push_str(&format!("Zuletzt aktualisiert: {} — ", tt.updated));
    }
    out.push_str(&session.state().to_string());
    if let Some(err) = session.last_error() {
        out.push_str(&format!(" ({err})"));
    }
    out.push('\n');
    out
}

fn render_holidays(out: &mut String, days_off: Option<u32>) {
    out.push_str("FERIEN\n");
    if let Some(days) = days_off.filter(|d| *d >= 1) {
        out.push_str(&format!("Bis zum nächsten Schultag noch {days} Tage frei!\n"));
    }
}

fn render_timetable(out: &mut String, tt: &MergedTimeTable, label_max_chars: usize) {
    out.push_str(heading(tt));
    out.push('\n');
    match parse_date(&tt.date) {
        Ok(date) => out.push_str(&date.format("%A, %-d. %B %Y").to_string()),
        Err(_) => out.push_str(&tt.date),
    }
    out.push_str("\n\n");

    out.push_str(&render_grid(tt, label_max_chars));

    if !tt.notes.is_empty() {
        out.push('\n');
        out.push_str(&tt.notes.join(" • "));
        out.push('\n');
    }
}

/// Grid as aligned text; each cell may span several lines.
pub fn render_grid(tt: &MergedTimeTable, label_max_chars: usize) -> String {
    // rows × columns × lines
    let mut rows: Vec<Vec<Vec<String>>> = Vec::with_capacity(tt.hours.len() + 1);

    let mut header = vec![vec!["Stunde".to_string()]];
    header.extend(tt.class_names.iter().map(|n| vec![n.clone()]));
    rows.push(header);

    for hour in &tt.hours {
        let mut hour_cell = vec![hour.hour.to_string()];
        if let Some(time) = &hour.time {
            hour_cell.push(format!("{}–{}", time.from, time.to));
        }
        let mut row = vec![hour_cell];
        row.extend(hour.subjects.iter().map(|slot| match slot {
            Some(lesson) => cell_lines(&LessonCell::new(lesson, label_max_chars)),
            None => Vec::new(),
        }));
        rows.push(row);
    }

    let columns = tt.class_names.len() + 1;
    let widths: Vec<usize> = (0..columns)
        .map(|c| {
            rows.iter()
                .filter_map(|r| r.get(c))
                .flat_map(|cell| cell.iter().map(|l| l.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    for (i, row) in rows.iter().enumerate() {
        let height = row.iter().map(Vec::len).max().unwrap_or(0).max(1);
        for line in 0..height {
            let text: Vec<String> = widths
                .iter()
                .enumerate()
                .map(|(c, w)| {
                    let s = row.get(c).and_then(|cell| cell.get(line)).map_or("", String::as_str);
                    pad(s, *w)
                })
                .collect();
            out.push_str(text.join(COLUMN_GAP).trim_end());
            out.push('\n');
        }
        if i == 0 {
            let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
            out.push_str(&rule.join("-+-"));
            out.push('\n');
        }
    }
    out
}

fn cell_lines(cell: &LessonCell) -> Vec<String> {
    let label = if cell.canceled {
        format!("{} (entfällt)", cell.label)
    } else {
        cell.label.clone()
    };
    let mut lines = vec![label, cell.teachers.clone()];
    if !cell.rooms.is_empty() {
        lines.push(format!("Raum {}", cell.rooms));
    }
    lines
}

fn pad(s: &str, width: usize) -> String {
    let fill = width.saturating_sub(s.chars().count());
    format!("{s}{}", " ".repeat(fill))
}

#[cfg(test)]
mod tests {
    use super::*;
    use timetable_core::types::{Lesson, LessonStatus, Subject, Time};
    use timetable_display::HourRow;

    fn lesson(code: &str, status: LessonStatus) -> Lesson {
        Lesson {
            nr: 1,
            subject: Subject {
                id: None,
                local_id: code.to_string(),
                name: None,
                tags: Vec::new(),
            },
            status,
            ..Default::default()
        }
    }

    fn merged(days_off: Option<u32>) -> MergedTimeTable {
        MergedTimeTable {
            date: "2025-01-06".to_string(),
            is_today: true,
            class_names: vec!["7".to_string(), "8".to_string()],
            hours: vec![
                HourRow {
                    hour: 1,
                    time: Some(Time {
                        id: None,
                        nr: 1,
                        from: "07:45".to_string(),
                        to: "08:30".to_string(),
                    }),
                    subjects: vec![Some(lesson("M", LessonStatus::Planned)), None],
                },
                HourRow {
                    hour: 2,
                    time: None,
                    subjects: vec![None, Some(lesson("Eng", LessonStatus::Canceled))],
                },
            ],
            notes: vec!["Wandertag".to_string(), "Sportzeug".to_string()],
            last_hour: Some(2),
            updated: "06.01.2025, 07:30".to_string(),
            days_off,
        }
    }

    fn loaded(m: MergedTimeTable) -> Session {
        let mut s = Session::new();
        s.begin_refresh();
        s.finish_ok(m);
        s
    }

    #[test]
    fn grid_lists_classes_hours_and_lessons() {
        let grid = render_grid(&merged(None), 15);
        let lines: Vec<&str> = grid.lines().collect();
        // hour column is as wide as its widest line, "07:45–08:30"
        assert_eq!(lines[0], "Stunde      | 7 | 8");
        assert!(lines[1].starts_with("------"));
        assert!(grid.contains("07:45–08:30"));
        assert!(grid.contains("Eng (entfällt)"));
        assert!(grid.contains('M'));
    }

    #[test]
    fn board_shows_heading_notes_and_footer() {
        let text = render_board(&loaded(merged(None)), &DisplayConfig::default());
        assert!(text.starts_with("Stundenplan\n"));
        assert!(text.contains("Monday, 6. January 2025"));
        assert!(text.contains("Wandertag • Sportzeug"));
        assert!(text.contains("Zuletzt aktualisiert: 06.01.2025, 07:30 — aktuell"));
    }

    #[test]
    fn long_break_renders_countdown() {
        let text = render_board(&loaded(merged(Some(12))), &DisplayConfig::default());
        assert!(text.starts_with("FERIEN\n"));
        assert!(text.contains("noch 12 Tage frei"));
        assert!(!text.contains("Stunde"));
    }

    #[test]
    fn error_without_timetable_shows_state_only() {
        let mut s = Session::new();
        s.begin_refresh();
        s.finish_err("HTTP error: dns");
        let text = render_board(&s, &DisplayConfig::default());
        assert_eq!(text, "\nFehler! (HTTP error: dns)\n");
    }
}
