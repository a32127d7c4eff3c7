//! `timetable-core` — shared building blocks of the timetable board.
//!
//! * [`config`] — layered configuration (defaults, TOML file, `TIMETABLE_*` env).
//! * [`dates`] — school-day and ISO-week date arithmetic.
//! * [`error`] — the crate-wide error type.
//! * [`types`] — the journal wire format and the resolved [`types::TimeTable`].

pub mod config;
pub mod dates;
pub mod error;
pub mod types;

pub use error::{Result, TimetableError};
