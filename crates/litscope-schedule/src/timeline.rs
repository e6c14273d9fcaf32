//! Gantt layout: rows, phase colors and the date range.
//!
//! Rows follow source order and the vertical axis is reversed, so row 0 sits
//! at the top of the chart. In chart coordinates the y axis spans
//! `0.0..rows as f64` and row `r` is centered on `rows - r - 0.5`.

use chrono::{Datelike, Months, NaiveDate};
use litscope_config::ScheduleConfig;

use crate::error::ScheduleError;
use crate::models::{Rgb, ScheduleEntry};

/// Bar height as a fraction of one row.
pub const BAR_THICKNESS: f64 = 0.6;

#[derive(Debug, Clone)]
pub struct TimelineOptions {
    /// Hex colors assigned to phases in order of first appearance, cycled.
    pub colors: Vec<String>,
    pub range_start: Option<NaiveDate>,
    pub range_end: Option<NaiveDate>,
}

impl From<&ScheduleConfig> for TimelineOptions {
    fn from(config: &ScheduleConfig) -> Self {
        Self {
            colors: config.colors.clone(),
            range_start: config.range_start,
            range_end: config.range_end,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineBar {
    pub row: usize,
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub phase: String,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    pub bars: Vec<TimelineBar>,
    /// Phase name and color, in order of first appearance.
    pub legend: Vec<(String, Rgb)>,
    pub x_start: NaiveDate,
    pub x_end: NaiveDate,
}

impl Timeline {
    pub fn rows(&self) -> usize {
        self.bars.len()
    }

    /// Vertical center of `row` on the reversed axis.
    pub fn row_center(&self, row: usize) -> f64 {
        self.rows() as f64 - row as f64 - 0.5
    }

    /// Bottom and top edge of the bar drawn on `row`.
    pub fn bar_span(&self, row: usize) -> (f64, f64) {
        let c = self.row_center(row);
        (c - BAR_THICKNESS / 2.0, c + BAR_THICKNESS / 2.0)
    }

    /// Row whose band contains the chart coordinate `y`, if any.
    pub fn row_at(&self, y: f64) -> Option<usize> {
        let n = self.rows() as f64;
        if !(0.0..n).contains(&y) {
            return None;
        }
        Some((n - y).floor() as usize).filter(|r| *r < self.rows())
    }

    /// First day of every month inside the x range.
    pub fn month_ticks(&self) -> Vec<NaiveDate> {
        let mut ticks = Vec::new();
        let mut t = first_of_month(self.x_start);
        if t < self.x_start {
            t = next_month(t);
        }
        while t <= self.x_end {
            ticks.push(t);
            t = next_month(t);
        }
        ticks
    }
}

fn first_of_month(d: NaiveDate) -> NaiveDate {
    d.with_day(1).unwrap_or(d)
}

fn next_month(d: NaiveDate) -> NaiveDate {
    d.checked_add_months(Months::new(1)).unwrap_or(NaiveDate::MAX)
}

/// Lay out one bar per entry. The x range is taken from the options when set
/// and otherwise padded from the data to whole months.
pub fn build_timeline(
    entries: &[ScheduleEntry],
    options: &TimelineOptions,
) -> Result<Timeline, ScheduleError> {
    if entries.is_empty() {
        return Err(ScheduleError::Empty);
    }
    let palette = options
        .colors
        .iter()
        .map(|c| Rgb::from_hex(c))
        .collect::<Result<Vec<_>, _>>()?;
    if palette.is_empty() {
        return Err(ScheduleError::InvalidColor(String::new()));
    }

    let mut legend: Vec<(String, Rgb)> = Vec::new();
    let mut bars = Vec::with_capacity(entries.len());
    for (row, entry) in entries.iter().enumerate() {
        let color = match legend.iter().find(|(phase, _)| *phase == entry.phase) {
            Some((_, color)) => *color,
            None => {
                let color = palette[legend.len() % palette.len()];
                legend.push((entry.phase.clone(), color));
                color
            }
        };
        bars.push(TimelineBar {
            row,
            label: entry.activity.clone(),
            start: entry.start,
            end: entry.end,
            phase: entry.phase.clone(),
            color,
        });
    }

    let min_start = entries.iter().map(|e| e.start).min().unwrap_or(NaiveDate::MIN);
    let max_end = entries.iter().map(|e| e.end).max().unwrap_or(NaiveDate::MAX);
    let x_start = options.range_start.unwrap_or_else(|| first_of_month(min_start));
    let x_end = options
        .range_end
        .unwrap_or_else(|| next_month(first_of_month(max_end)));

    Ok(Timeline { bars, legend, x_start, x_end })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn entry(activity: &str, start: NaiveDate, end: NaiveDate, phase: &str) -> ScheduleEntry {
        ScheduleEntry { activity: activity.into(), start, end, phase: phase.into() }
    }

    fn options() -> TimelineOptions {
        TimelineOptions {
            colors: litscope_config::default_colors(),
            range_start: None,
            range_end: None,
        }
    }

    #[test]
    fn test_overlapping_activities_get_distinct_rows() {
        let entries = vec![
            entry("Review", date(2019, 3, 1), date(2019, 6, 30), "Planning"),
            entry("Fieldwork", date(2019, 5, 1), date(2019, 8, 15), "Data"),
        ];
        let t = build_timeline(&entries, &options()).unwrap();

        assert_eq!(t.bars[0].row, 0);
        assert_eq!(t.bars[1].row, 1);
        // reversed axis: row 0 above row 1, bars do not overlap vertically
        let (r0_bottom, _) = t.bar_span(0);
        let (_, r1_top) = t.bar_span(1);
        assert!(t.row_center(0) > t.row_center(1));
        assert!(r0_bottom > r1_top);
        assert_eq!(t.row_at(t.row_center(0)), Some(0));
        assert_eq!(t.row_at(t.row_center(1)), Some(1));
    }

    #[test]
    fn test_phase_colors_follow_first_appearance_and_cycle() {
        let d = date(2020, 1, 1);
        let phases = ["A", "B", "A", "C", "D", "E", "F"];
        let entries: Vec<_> = phases
            .iter()
            .enumerate()
            .map(|(i, p)| entry(&format!("task {i}"), d, d, p))
            .collect();
        let t = build_timeline(&entries, &options()).unwrap();

        let palette: Vec<Rgb> = litscope_config::default_colors()
            .iter()
            .map(|c| Rgb::from_hex(c).unwrap())
            .collect();
        assert_eq!(t.bars[0].color, palette[0]);
        assert_eq!(t.bars[1].color, palette[1]);
        assert_eq!(t.bars[2].color, palette[0]);
        // sixth distinct phase wraps around
        assert_eq!(t.bars[6].color, palette[0]);
        let names: Vec<_> = t.legend.iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C", "D", "E", "F"]);
    }

    #[test]
    fn test_range_padded_to_whole_months() {
        let entries = vec![entry("x", date(2019, 3, 14), date(2019, 6, 2), "P")];
        let t = build_timeline(&entries, &options()).unwrap();
        assert_eq!(t.x_start, date(2019, 3, 1));
        assert_eq!(t.x_end, date(2019, 7, 1));
        assert_eq!(
            t.month_ticks(),
            vec![date(2019, 3, 1), date(2019, 4, 1), date(2019, 5, 1), date(2019, 6, 1), date(2019, 7, 1)]
        );
    }

    #[test]
    fn test_explicit_range_wins() {
        let entries = vec![entry("x", date(2019, 3, 14), date(2019, 6, 2), "P")];
        let opts = TimelineOptions {
            range_start: Some(date(2019, 1, 15)),
            range_end: Some(date(2020, 1, 1)),
            ..options()
        };
        let t = build_timeline(&entries, &opts).unwrap();
        assert_eq!((t.x_start, t.x_end), (date(2019, 1, 15), date(2020, 1, 1)));
        assert_eq!(t.month_ticks().first(), Some(&date(2019, 2, 1)));
    }

    #[test]
    fn test_empty_and_bad_palette() {
        assert!(matches!(build_timeline(&[], &options()), Err(ScheduleError::Empty)));

        let d = date(2020, 1, 1);
        let opts = TimelineOptions { colors: vec!["teal".into()], ..options() };
        assert!(matches!(
            build_timeline(&[entry("x", d, d, "P")], &opts),
            Err(ScheduleError::InvalidColor(_))
        ));
    }
}
