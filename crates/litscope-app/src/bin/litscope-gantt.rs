//! litscope-gantt: project schedule spreadsheet → Gantt chart PNG.

use anyhow::Context;
use litscope_charts::{fonts, render_gantt, GanttStyle};
use litscope_schedule::{build_timeline, read_schedule, ColumnNames, TimelineOptions};
use tracing::info;

fn main() -> anyhow::Result<()> {
    litscope_app::init();
    let config = litscope_app::load_config()?;
    let schedule = &config.schedule;

    let entries = read_schedule(
        &schedule.input,
        &ColumnNames::from(schedule),
        &schedule.date_format,
    )
    .with_context(|| format!("Failed to read schedule {}", schedule.input.display()))?;

    let timeline = build_timeline(&entries, &TimelineOptions::from(schedule))?;
    info!(
        activities = timeline.rows(),
        phases = timeline.legend.len(),
        from = %timeline.x_start,
        to = %timeline.x_end,
        "Timeline built"
    );

    fonts::ensure_font(config.charts.font_path.as_deref())?;
    render_gantt(
        &timeline,
        &schedule.output,
        &GanttStyle::new(&config.charts, &schedule.title),
    )
    .with_context(|| format!("Failed to render {}", schedule.output.display()))?;

    info!(chart = %schedule.output.display(), "Done");
    Ok(())
}
