use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unsupported schedule file type: {0}")]
    UnsupportedFormat(PathBuf),

    #[error("Column '{0}' not found in the header row")]
    MissingColumn(String),

    /// `row` is the 1-based sheet row, header included.
    #[error("Row {row}: cannot parse '{value}' in column '{column}' as a date")]
    InvalidDate { row: usize, column: String, value: String },

    #[error("Row {row}: '{activity}' ends before it starts")]
    EndBeforeStart { row: usize, activity: String },

    #[error("Invalid color '{0}', expected #RRGGBB")]
    InvalidColor(String),

    #[error("Schedule has no activities")]
    Empty,
}

impl From<calamine::Error> for ScheduleError {
    fn from(e: calamine::Error) -> Self {
        ScheduleError::Spreadsheet(e.to_string())
    }
}
