//! litscope-search: Scopus search → records CSV → publications per year.

use anyhow::Context;
use litscope_charts::{fonts, render_year_counts, BarChartStyle};
use litscope_ingestion::keys::KeyPool;
use litscope_ingestion::pipeline::{run_search_pipeline, SearchJob};
use litscope_ingestion::retry::KeyRotation;
use litscope_ingestion::sources::scopus::ScopusClient;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    litscope_app::init();
    let mut config = litscope_app::load_config()?;

    let client = ScopusClient::new(&config.scopus).context("Failed to build Scopus client")?;
    let pool = KeyPool::new(std::mem::take(&mut config.scopus.api_keys))?;
    let mut rotation = KeyRotation::new(pool, config.retry.clone());
    let job = SearchJob::from_config(&config);

    info!(query = %job.query, "Starting Scopus extraction");
    let summary = run_search_pipeline(&client, &mut rotation, &job).await?;

    if summary.year_counts.is_empty() {
        warn!(
            publication_type = %job.publication_type,
            "No dated records of this type; skipping the year chart"
        );
        return Ok(());
    }

    fonts::ensure_font(config.charts.font_path.as_deref())?;
    let style = BarChartStyle::new(
        &config.charts,
        &config.search.chart_title,
        &config.search.chart_source_note,
    );
    render_year_counts(&summary.year_counts, &config.search.year_chart, &style)
        .with_context(|| format!("Failed to render {}", config.search.year_chart.display()))?;

    info!(
        records = %job.records_csv.display(),
        chart = %config.search.year_chart.display(),
        "Done"
    );
    Ok(())
}
