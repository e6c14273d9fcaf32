//! Schedule input: first worksheet of a spreadsheet, or a CSV file.
//!
//! The header row locates the activity, start, end and phase columns by name.
//! Everything below it is one activity per row; blank rows are skipped.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use chrono::{Duration, NaiveDate};
use litscope_config::ScheduleConfig;
use tracing::{debug, info};

use crate::error::ScheduleError;
use crate::models::ScheduleEntry;

/// Header names of the four schedule columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnNames {
    pub activity: String,
    pub start: String,
    pub end: String,
    pub phase: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            activity: "Activity".into(),
            start: "Start".into(),
            end: "End".into(),
            phase: "Phase".into(),
        }
    }
}

impl From<&ScheduleConfig> for ColumnNames {
    fn from(config: &ScheduleConfig) -> Self {
        Self {
            activity: config.activity_column.clone(),
            start: config.start_column.clone(),
            end: config.end_column.clone(),
            phase: config.phase_column.clone(),
        }
    }
}

/// A cell as read from either input kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    /// Spreadsheet serial date: days since 1899-12-30, fraction = time of day.
    Serial(f64),
    Empty,
}

impl Cell {
    fn text(&self) -> String {
        match self {
            Cell::Text(s) => s.trim().to_string(),
            Cell::Serial(v) => v.to_string(),
            Cell::Empty => String::new(),
        }
    }

    fn is_blank(&self) -> bool {
        match self {
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Serial(_) => false,
            Cell::Empty => true,
        }
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::DateTimeIso(s) => Cell::Text(s.clone()),
            Data::DateTime(dt) => Cell::Serial(dt.as_f64()),
            Data::Float(f) => Cell::Serial(*f),
            Data::Int(i) => Cell::Serial(*i as f64),
            other => Cell::Text(other.to_string()),
        }
    }
}

/// Read and validate a schedule file. The format follows the file extension.
pub fn read_schedule(
    path: &Path,
    columns: &ColumnNames,
    date_format: &str,
) -> Result<Vec<ScheduleEntry>, ScheduleError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let rows = match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => spreadsheet_rows(path)?,
        "csv" => csv_rows(path)?,
        _ => return Err(ScheduleError::UnsupportedFormat(path.to_path_buf())),
    };
    debug!(path = %path.display(), rows = rows.len(), "Schedule rows read");

    let entries = entries_from_rows(&rows, columns, date_format)?;
    info!(path = %path.display(), activities = entries.len(), "Schedule loaded");
    Ok(entries)
}

fn spreadsheet_rows(path: &Path) -> Result<Vec<Vec<Cell>>, ScheduleError> {
    if !path.exists() {
        return Err(ScheduleError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        });
    }
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ScheduleError::Spreadsheet("workbook has no worksheets".into()))??;

    Ok(range
        .rows()
        .map(|row| row.iter().map(Cell::from).collect())
        .collect())
}

fn csv_rows(path: &Path) -> Result<Vec<Vec<Cell>>, ScheduleError> {
    let file = std::fs::File::open(path).map_err(|source| ScheduleError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(
            record
                .iter()
                .map(|v| if v.is_empty() { Cell::Empty } else { Cell::Text(v.to_string()) })
                .collect(),
        );
    }
    Ok(rows)
}

/// Turn raw rows (header first) into validated entries.
pub fn entries_from_rows(
    rows: &[Vec<Cell>],
    columns: &ColumnNames,
    date_format: &str,
) -> Result<Vec<ScheduleEntry>, ScheduleError> {
    let (header, body) = rows.split_first().ok_or(ScheduleError::Empty)?;
    let find = |name: &str| {
        header
            .iter()
            .position(|c| c.text() == name)
            .ok_or_else(|| ScheduleError::MissingColumn(name.to_string()))
    };
    let activity_idx = find(&columns.activity)?;
    let start_idx = find(&columns.start)?;
    let end_idx = find(&columns.end)?;
    let phase_idx = find(&columns.phase)?;

    let empty = Cell::Empty;
    let mut entries = Vec::new();
    for (i, row) in body.iter().enumerate() {
        let row_no = i + 2;
        if row.iter().all(Cell::is_blank) {
            continue;
        }
        let cell = |idx: usize| row.get(idx).unwrap_or(&empty);

        let start = parse_date(cell(start_idx), date_format)
            .ok_or_else(|| invalid_date(row_no, &columns.start, cell(start_idx)))?;
        let end = parse_date(cell(end_idx), date_format)
            .ok_or_else(|| invalid_date(row_no, &columns.end, cell(end_idx)))?;
        let activity = cell(activity_idx).text();

        if end < start {
            return Err(ScheduleError::EndBeforeStart { row: row_no, activity });
        }
        entries.push(ScheduleEntry {
            activity,
            start,
            end,
            phase: cell(phase_idx).text(),
        });
    }

    if entries.is_empty() {
        return Err(ScheduleError::Empty);
    }
    Ok(entries)
}

fn invalid_date(row: usize, column: &str, cell: &Cell) -> ScheduleError {
    ScheduleError::InvalidDate {
        row,
        column: column.to_string(),
        value: cell.text(),
    }
}

/// Date text in `date_format`, ISO datetime text, or a spreadsheet serial.
pub fn parse_date(cell: &Cell, date_format: &str) -> Option<NaiveDate> {
    match cell {
        Cell::Text(s) => {
            let s = s.trim();
            NaiveDate::parse_from_str(s, date_format)
                .ok()
                .or_else(|| s.get(..10).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()))
        }
        Cell::Serial(v) => from_serial(*v),
        Cell::Empty => None,
    }
}

fn from_serial(days: f64) -> Option<NaiveDate> {
    if !days.is_finite() || days < 1.0 {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_signed(Duration::days(days.floor() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn header() -> Vec<Cell> {
        vec![text("Activity"), text("Start"), text("End"), text("Phase")]
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_text_dates_use_day_month_year() {
        let rows = vec![
            header(),
            vec![text("Literature review"), text("01-03-2019"), text("30-06-2019"), text("Planning")],
        ];
        let entries = entries_from_rows(&rows, &ColumnNames::default(), "%d-%m-%Y").unwrap();
        assert_eq!(
            entries,
            vec![ScheduleEntry {
                activity: "Literature review".into(),
                start: date(2019, 3, 1),
                end: date(2019, 6, 30),
                phase: "Planning".into(),
            }]
        );
    }

    #[test]
    fn test_serial_dates_and_column_order() {
        // 43525 = 2019-03-01, 43646 = 2019-06-30
        let rows = vec![
            vec![text("Phase"), text("End"), text("Activity"), text("Start")],
            vec![text("Data"), Cell::Serial(43646.0), text("Fieldwork"), Cell::Serial(43525.5)],
        ];
        let entries = entries_from_rows(&rows, &ColumnNames::default(), "%d-%m-%Y").unwrap();
        assert_eq!(entries[0].start, date(2019, 3, 1));
        assert_eq!(entries[0].end, date(2019, 6, 30));
        assert_eq!(entries[0].activity, "Fieldwork");
    }

    #[test]
    fn test_blank_rows_are_skipped() {
        let rows = vec![
            header(),
            vec![Cell::Empty, Cell::Empty, Cell::Empty, Cell::Empty],
            vec![text("Writing"), text("01-01-2020"), text("01-02-2020"), text("Thesis")],
        ];
        let entries = entries_from_rows(&rows, &ColumnNames::default(), "%d-%m-%Y").unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_missing_column() {
        let rows = vec![vec![text("Activity"), text("Start"), text("Phase")]];
        let err = entries_from_rows(&rows, &ColumnNames::default(), "%d-%m-%Y").unwrap_err();
        assert!(matches!(err, ScheduleError::MissingColumn(c) if c == "End"));
    }

    #[test]
    fn test_invalid_date_names_row_and_column() {
        let rows = vec![
            header(),
            vec![text("A"), text("01-01-2020"), text("01-02-2020"), text("P")],
            vec![text("B"), text("2020/13/45"), text("01-02-2020"), text("P")],
        ];
        let err = entries_from_rows(&rows, &ColumnNames::default(), "%d-%m-%Y").unwrap_err();
        match err {
            ScheduleError::InvalidDate { row, column, value } => {
                assert_eq!(row, 3);
                assert_eq!(column, "Start");
                assert_eq!(value, "2020/13/45");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_end_before_start_is_rejected() {
        let rows = vec![
            header(),
            vec![text("Backwards"), text("10-05-2020"), text("01-05-2020"), text("P")],
        ];
        let err = entries_from_rows(&rows, &ColumnNames::default(), "%d-%m-%Y").unwrap_err();
        assert!(matches!(err, ScheduleError::EndBeforeStart { row: 2, .. }));
    }

    #[test]
    fn test_header_only_is_empty() {
        let err = entries_from_rows(&[header()], &ColumnNames::default(), "%d-%m-%Y").unwrap_err();
        assert!(matches!(err, ScheduleError::Empty));
        assert!(matches!(
            entries_from_rows(&[], &ColumnNames::default(), "%d-%m-%Y"),
            Err(ScheduleError::Empty)
        ));
    }

    #[test]
    fn test_iso_datetime_text() {
        assert_eq!(
            parse_date(&text("2021-07-04T00:00:00"), "%d-%m-%Y"),
            Some(date(2021, 7, 4))
        );
        assert_eq!(parse_date(&Cell::Serial(0.0), "%d-%m-%Y"), None);
    }
}
