//! Gantt chart of a project schedule.
//!
//! x is measured in days from `Timeline::x_start`; y uses the timeline's
//! reversed row axis. Month ticks, row labels and the legend are placed in
//! pixel space so they land exactly on the layout's positions.

use std::path::Path;

use chrono::NaiveDate;
use litscope_config::ChartsConfig;
use litscope_schedule::Timeline;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use tracing::info;

use crate::error::{drawing, ChartError};
use crate::fonts::FONT_FAMILY;
use crate::palette::{to_plotters, AXIS_GRAY, GRID_GRAY};

const BAR_OPACITY: f64 = 0.9;
const LEGEND_HEIGHT: u32 = 40;
const SWATCH: i32 = 14;
const SWATCH_GAP: i32 = 6;
const ITEM_GAP: i32 = 24;
/// More month labels than this and only every n-th month is labelled.
const MAX_MONTH_LABELS: usize = 12;

#[derive(Debug, Clone)]
pub struct GanttStyle {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl GanttStyle {
    pub fn new(charts: &ChartsConfig, title: &str) -> Self {
        Self {
            width: charts.gantt_width,
            height: charts.gantt_height,
            title: title.to_string(),
        }
    }
}

fn day_offset(origin: NaiveDate, d: NaiveDate) -> f64 {
    (d - origin).num_days() as f64
}

/// Label every `step`-th month so at most `max_labels` labels are drawn.
pub fn label_step(n_ticks: usize, max_labels: usize) -> usize {
    if max_labels == 0 {
        return n_ticks.max(1);
    }
    n_ticks.div_ceil(max_labels).max(1)
}

/// Left x of each legend item, centering the whole row in `area_width`.
///
/// `text_widths` are the rendered widths of the phase names.
pub fn legend_positions(text_widths: &[u32], area_width: u32) -> Vec<i32> {
    let item_widths: Vec<i32> = text_widths
        .iter()
        .map(|w| SWATCH + SWATCH_GAP + *w as i32)
        .collect();
    let total: i32 = item_widths.iter().sum::<i32>()
        + ITEM_GAP * (item_widths.len() as i32 - 1).max(0);

    let mut x = ((area_width as i32 - total) / 2).max(0);
    item_widths
        .iter()
        .map(|w| {
            let left = x;
            x += w + ITEM_GAP;
            left
        })
        .collect()
}

/// Width reserved for the activity labels, from the longest label.
fn label_area_width(timeline: &Timeline, measure: impl Fn(&str) -> u32) -> u32 {
    timeline
        .bars
        .iter()
        .map(|b| measure(&b.label))
        .max()
        .unwrap_or(0)
        + 16
}

/// Render `timeline` as a PNG at `path`.
///
/// The chart font must be registered first (`fonts::ensure_font`).
pub fn render_gantt(timeline: &Timeline, path: &Path, style: &GanttStyle) -> Result<(), ChartError> {
    if timeline.bars.is_empty() {
        return Err(ChartError::EmptyData);
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let root = BitMapBackend::new(path, (style.width, style.height)).into_drawing_area();
    root.fill(&WHITE).map_err(drawing)?;
    let (upper, legend_area) = root.split_vertically(style.height.saturating_sub(LEGEND_HEIGHT));

    let row_style = TextStyle::from((FONT_FAMILY, 13).into_font().style(FontStyle::Bold))
        .pos(Pos::new(HPos::Right, VPos::Center));
    let tick_style = TextStyle::from((FONT_FAMILY, 12).into_font())
        .pos(Pos::new(HPos::Center, VPos::Top));
    let legend_style = TextStyle::from((FONT_FAMILY, 13).into_font())
        .pos(Pos::new(HPos::Left, VPos::Center));

    let label_width = label_area_width(timeline, |s| {
        upper
            .estimate_text_size(s, &row_style)
            .map(|(w, _)| w)
            .unwrap_or(s.len() as u32 * 8)
    });

    let origin = timeline.x_start;
    let span = day_offset(origin, timeline.x_end).max(1.0);
    let rows = timeline.rows() as f64;

    let mut chart = ChartBuilder::on(&upper)
        .caption(&style.title, (FONT_FAMILY, 20).into_font().style(FontStyle::Bold))
        .margin(12)
        .x_label_area_size(28)
        .y_label_area_size(label_width)
        .build_cartesian_2d(0f64..span, 0f64..rows)
        .map_err(drawing)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(0)
        .y_labels(0)
        .axis_style(AXIS_GRAY)
        .draw()
        .map_err(drawing)?;

    // Monthly grid
    let ticks = timeline.month_ticks();
    chart
        .draw_series(ticks.iter().map(|t| {
            let x = day_offset(origin, *t);
            PathElement::new(vec![(x, 0.0), (x, rows)], GRID_GRAY)
        }))
        .map_err(drawing)?;

    chart
        .draw_series(timeline.bars.iter().map(|b| {
            let (y0, y1) = timeline.bar_span(b.row);
            let x0 = day_offset(origin, b.start);
            let x1 = day_offset(origin, b.end) + 1.0;
            Rectangle::new([(x0, y0), (x1, y1)], to_plotters(b.color).mix(BAR_OPACITY).filled())
        }))
        .map_err(drawing)?;

    // Month labels under the axis
    let step = label_step(ticks.len(), MAX_MONTH_LABELS);
    for t in ticks.iter().step_by(step) {
        let (px, py) = chart.backend_coord(&(day_offset(origin, *t), 0.0));
        upper
            .draw_text(&t.format("%b %Y").to_string(), &tick_style, (px, py + 6))
            .map_err(drawing)?;
    }

    // Activity labels, row 0 at the top
    for b in &timeline.bars {
        let (px, py) = chart.backend_coord(&(0.0, timeline.row_center(b.row)));
        upper
            .draw_text(&b.label, &row_style, (px - 8, py))
            .map_err(drawing)?;
    }

    draw_legend(&legend_area, timeline, &legend_style)?;

    root.present().map_err(drawing)?;
    info!(path = %path.display(), bars = timeline.rows(), "Gantt chart written");
    Ok(())
}

fn draw_legend<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    timeline: &Timeline,
    text_style: &TextStyle,
) -> Result<(), ChartError> {
    let widths: Vec<u32> = timeline
        .legend
        .iter()
        .map(|(phase, _)| {
            area.estimate_text_size(phase, text_style)
                .map(|(w, _)| w)
                .unwrap_or(phase.len() as u32 * 8)
        })
        .collect();
    let (area_width, area_height) = area.dim_in_pixel();
    let positions = legend_positions(&widths, area_width);
    let y = area_height as i32 / 2;

    for ((phase, color), x) in timeline.legend.iter().zip(positions) {
        area.draw(&Rectangle::new(
            [(x, y - SWATCH / 2), (x + SWATCH, y + SWATCH / 2)],
            to_plotters(*color).mix(BAR_OPACITY).filled(),
        ))
        .map_err(drawing)?;
        area.draw_text(phase, text_style, (x + SWATCH + SWATCH_GAP, y))
            .map_err(drawing)?;
    }
    Ok(())
}
