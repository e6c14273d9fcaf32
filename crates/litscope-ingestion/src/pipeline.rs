//! End-to-end search extraction pipeline.
//!
//! Orchestrates one run:
//!   1. Page through the search results and collect EIDs
//!   2. Retrieve and flatten every document, one at a time
//!   3. Export the records to a fully-quoted CSV
//!   4. Count publications of one type per year and export the counts
//!
//! Chart rendering happens in the binary so this crate stays free of drawing code.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context};
use litscope_common::YearCount;
use litscope_config::Config;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::aggregate::count_by_year;
use crate::collector::{Collection, RecordCollector};
use crate::export::{write_records_csv, write_year_counts_csv};
use crate::retry::KeyRotation;
use crate::sources::scopus::{search_all, SearchOptions};
use crate::sources::{AbstractSource, SearchSource};

// ── Job config ────────────────────────────────────────────────────────────────

/// Parameters for a single extraction run.
#[derive(Debug, Clone)]
pub struct SearchJob {
    pub query: String,
    pub view: String,
    pub options: SearchOptions,
    pub publication_type: String,
    pub records_csv: PathBuf,
    pub year_counts_csv: PathBuf,
}

impl SearchJob {
    pub fn from_config(config: &Config) -> Self {
        Self {
            query: config.search.query.clone(),
            view: config.scopus.view.clone(),
            options: SearchOptions::from(&config.scopus),
            publication_type: config.search.publication_type.clone(),
            records_csv: config.search.records_csv.clone(),
            year_counts_csv: config.search.year_counts_csv.clone(),
        }
    }
}

// ── Result summary ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct SearchRunSummary {
    pub query: String,
    pub total_results: usize,
    pub eids_found: usize,
    pub retrieved: usize,
    pub not_found: Vec<String>,
    pub year_counts: Vec<YearCount>,
    pub duration_ms: u64,
}

// ── Pipeline orchestrator ─────────────────────────────────────────────────────

/// Runs the search, retrieval, export and aggregation stages for one job.
///
/// Any error other than a missing document aborts the run.
#[instrument(skip(source, rotation, job), fields(query = %job.query))]
pub async fn run_search_pipeline<S>(
    source: &S,
    rotation: &mut KeyRotation,
    job: &SearchJob,
) -> anyhow::Result<SearchRunSummary>
where
    S: SearchSource + AbstractSource + ?Sized,
{
    let t0 = Instant::now();
    if job.query.trim().is_empty() {
        bail!("search.query is empty; set it in the config file");
    }

    // ── 1. Search ─────────────────────────────────────────────────────────────
    let found = search_all(source, rotation, &job.query, &job.options)
        .await
        .context("Scopus search failed")?;
    info!(total = found.total_results, eids = found.eids.len(), "Search complete");

    // ── 2. Retrieve ───────────────────────────────────────────────────────────
    let mut collection = Collection::default();
    let retrieval = RecordCollector::new(source, rotation, &job.view)
        .collect_into(&found.eids, &mut collection)
        .await;
    if let Err(e) = retrieval {
        warn!(
            written = collection.records.len(),
            total = found.eids.len(),
            "Retrieval aborted, writing the records collected so far"
        );
        write_records_csv(&job.records_csv, &collection.records)
            .with_context(|| format!("Failed to write {}", job.records_csv.display()))?;
        return Err(anyhow::Error::new(e).context("Document retrieval aborted"));
    }

    // ── 3. Export ─────────────────────────────────────────────────────────────
    write_records_csv(&job.records_csv, &collection.records)
        .with_context(|| format!("Failed to write {}", job.records_csv.display()))?;

    // ── 4. Aggregate ──────────────────────────────────────────────────────────
    let year_counts = count_by_year(&collection.records, &job.publication_type);
    write_year_counts_csv(&job.year_counts_csv, &year_counts)
        .with_context(|| format!("Failed to write {}", job.year_counts_csv.display()))?;

    let summary = SearchRunSummary {
        query: job.query.clone(),
        total_results: found.total_results,
        eids_found: found.eids.len(),
        retrieved: collection.retrieved,
        not_found: collection.not_found,
        year_counts,
        duration_ms: t0.elapsed().as_millis() as u64,
    };

    info!(
        retrieved = summary.retrieved,
        not_found = summary.not_found.len(),
        years = summary.year_counts.len(),
        duration_ms = summary.duration_ms,
        "Search pipeline complete"
    );
    Ok(summary)
}
