//! Publications-per-year bar chart.

use std::path::Path;

use litscope_common::YearCount;
use litscope_config::ChartsConfig;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use tracing::info;

use crate::error::{drawing, ChartError};
use crate::fonts::FONT_FAMILY;
use crate::palette::{reds, AXIS_GRAY, GRID_GRAY, NOTE_GRAY};

const FOOTER_HEIGHT: u32 = 28;

#[derive(Debug, Clone)]
pub struct BarChartStyle {
    pub width: u32,
    pub height: u32,
    pub title: String,
    /// Small print in the bottom-right corner, e.g. the data source.
    pub source_note: String,
}

impl BarChartStyle {
    pub fn new(charts: &ChartsConfig, title: &str, source_note: &str) -> Self {
        Self {
            width: charts.bar_width,
            height: charts.bar_height,
            title: title.to_string(),
            source_note: source_note.to_string(),
        }
    }
}

/// Top of the y axis: the largest count plus about 10% headroom.
pub fn y_axis_max(counts: &[YearCount]) -> usize {
    let max = counts.iter().map(|c| c.count).max().unwrap_or(0);
    max + max / 10 + 1
}

/// Render one bar per year, darker reds for later years.
///
/// The chart font must be registered first (`fonts::ensure_font`).
pub fn render_year_counts(
    counts: &[YearCount],
    path: &Path,
    style: &BarChartStyle,
) -> Result<(), ChartError> {
    if counts.is_empty() {
        return Err(ChartError::EmptyData);
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let root = BitMapBackend::new(path, (style.width, style.height)).into_drawing_area();
    root.fill(&WHITE).map_err(drawing)?;
    let (plot, footer) = root.split_vertically(style.height.saturating_sub(FOOTER_HEIGHT));

    let years: Vec<String> = counts.iter().map(|c| c.year.to_string()).collect();
    let colors = reds(counts.len());

    let mut chart = ChartBuilder::on(&plot)
        .caption(&style.title, (FONT_FAMILY, 24).into_font().style(FontStyle::Bold))
        .margin(16)
        .x_label_area_size(70)
        .y_label_area_size(50)
        .build_cartesian_2d((0..counts.len()).into_segmented(), 0usize..y_axis_max(counts))
        .map_err(drawing)?;

    let year_label = |v: &SegmentValue<usize>| match v {
        SegmentValue::CenterOf(i) => years.get(*i).cloned().unwrap_or_default(),
        _ => String::new(),
    };

    chart
        .configure_mesh()
        .disable_x_mesh()
        .bold_line_style(GRID_GRAY)
        .light_line_style(WHITE)
        .axis_style(AXIS_GRAY)
        .x_labels(counts.len())
        .x_label_formatter(&year_label)
        .x_label_style(
            TextStyle::from((FONT_FAMILY, 13).into_font()).transform(FontTransform::Rotate90),
        )
        .y_label_style((FONT_FAMILY, 13))
        .x_desc("Publication year")
        .axis_desc_style((FONT_FAMILY, 15))
        .draw()
        .map_err(drawing)?;

    chart
        .draw_series(counts.iter().enumerate().map(|(i, c)| {
            let mut bar = Rectangle::new(
                [(SegmentValue::Exact(i), 0), (SegmentValue::Exact(i + 1), c.count)],
                colors[i].filled(),
            );
            bar.set_margin(0, 0, 3, 3);
            bar
        }))
        .map_err(drawing)?;

    let note_style = TextStyle::from((FONT_FAMILY, 12).into_font())
        .color(&NOTE_GRAY)
        .pos(Pos::new(HPos::Right, VPos::Center));
    footer
        .draw_text(
            &style.source_note,
            &note_style,
            (style.width as i32 - 16, FOOTER_HEIGHT as i32 / 2),
        )
        .map_err(drawing)?;

    root.present().map_err(drawing)?;
    info!(path = %path.display(), bars = counts.len(), "Bar chart written");
    Ok(())
}
