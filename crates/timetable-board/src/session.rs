use std::fmt;

use timetable_display::MergedTimeTable;

/// Lifecycle of the most recent refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Initial,
    Loading,
    Loaded,
    Error,
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LoadState::Initial | LoadState::Loading => "Lade …",
            LoadState::Loaded => "aktuell",
            LoadState::Error => "Fehler!",
        };
        write!(f, "{s}")
    }
}

/// In-memory board state; discarded on every reload.
#[derive(Debug)]
pub struct Session {
    state: LoadState,
    timetable: Option<MergedTimeTable>,
    last_error: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: LoadState::Initial,
            timetable: None,
            last_error: None,
        }
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn timetable(&self) -> Option<&MergedTimeTable> {
        self.timetable.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Enter `Loading`. Returns false if a refresh is already in flight.
    pub fn begin_refresh(&mut self) -> bool {
        if self.state == LoadState::Loading {
            return false;
        }
        self.state = LoadState::Loading;
        true
    }

    /// Replace the shown timetable with a fresh one.
    pub fn finish_ok(&mut self, timetable: MergedTimeTable) {
        self.timetable = Some(timetable);
        self.last_error = None;
        self.state = LoadState::Loaded;
    }

    /// Keep the last good timetable and flag the failure.
    pub fn finish_err(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
        self.state = LoadState::Error;
    }

    /// Periodic refreshes pause while days off lie ahead; the next reload
    /// picks the timetable up again.
    pub fn wants_periodic_refresh(&self) -> bool {
        match &self.timetable {
            None => true,
            Some(t) => t.days_off.unwrap_or(0) == 0,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
