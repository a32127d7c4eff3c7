//! `timetable-display` — turns a resolved [`TimeTable`] into what the board shows.
//!
//! [`merge::MergedTimeTable`] is the rectangular hour × class grid,
//! [`cell::LessonCell`] the text of one grid cell and [`mode::DisplayMode`]
//! decides between the grid, a holiday countdown and "no school found".
//!
//! [`TimeTable`]: timetable_core::types::TimeTable

pub mod cell;
pub mod merge;
pub mod mode;

pub use cell::LessonCell;
pub use merge::{merge_timetable, HourRow, MergedTimeTable};
pub use mode::DisplayMode;
