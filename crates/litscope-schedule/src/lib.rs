//! litscope-schedule — Project schedule loading and Gantt layout.
//! - Reads a four-column schedule from xlsx/xls/ods or CSV
//! - Parses day-month-year date text as well as native spreadsheet dates
//! - Lays out one bar per activity, colored by phase, on a reversed row axis

pub mod error;
pub mod models;
pub mod reader;
pub mod timeline;

pub use error::ScheduleError;
pub use models::{Rgb, ScheduleEntry};
pub use reader::{read_schedule, ColumnNames};
pub use timeline::{build_timeline, Timeline, TimelineBar, TimelineOptions};
