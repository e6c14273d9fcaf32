//! CSV export of flattened records and year counts.
//!
//! Every field is quoted. Nested lists are stored as JSON text so the file
//! can be read back into the same logical rows.

use std::fs::{self, File};
use std::path::Path;

use chrono::NaiveDate;
use csv::{QuoteStyle, StringRecord, WriterBuilder};
use litscope_common::{Result, YearCount};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::models::BibliographicRecord;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Column order of the records file.
pub const RECORD_COLUMNS: [&str; 28] = [
    "id",
    "doi",
    "eid",
    "pii",
    "pubmed_id",
    "title",
    "abstract",
    "description",
    "publication_date",
    "cited_by_count",
    "language",
    "aggregation_type",
    "source_type",
    "author_keywords",
    "index_terms",
    "issn",
    "isbn",
    "conference_location",
    "conference_name",
    "publication_name",
    "publisher_address",
    "issue_title",
    "publisher",
    "affiliations",
    "authors",
    "author_affiliations",
    "ref_count",
    "references",
];

pub const YEAR_COUNT_COLUMNS: [&str; 2] = ["year", "count"];

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

fn quoted_writer(path: &Path) -> Result<csv::Writer<File>> {
    create_parent(path)?;
    Ok(WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .has_headers(false)
        .from_path(path)?)
}

fn json_field<T: Serialize>(value: &Option<T>) -> Result<String> {
    Ok(match value {
        Some(v) => serde_json::to_string(v)?,
        None => String::new(),
    })
}

fn plain<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

fn record_row(r: &BibliographicRecord) -> Result<Vec<String>> {
    Ok(vec![
        plain(&r.id),
        plain(&r.doi),
        plain(&r.eid),
        plain(&r.pii),
        plain(&r.pubmed_id),
        plain(&r.title),
        plain(&r.abstract_text),
        plain(&r.description),
        r.publication_date
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_default(),
        plain(&r.cited_by_count),
        plain(&r.language),
        plain(&r.aggregation_type),
        plain(&r.source_type),
        json_field(&r.author_keywords)?,
        json_field(&r.index_terms)?,
        plain(&r.issn),
        plain(&r.isbn),
        plain(&r.conference_location),
        plain(&r.conference_name),
        plain(&r.publication_name),
        plain(&r.publisher_address),
        plain(&r.issue_title),
        plain(&r.publisher),
        json_field(&r.affiliations)?,
        json_field(&r.authors)?,
        json_field(&r.author_affiliations)?,
        plain(&r.ref_count),
        json_field(&r.references)?,
    ])
}

/// Write all records with a header row. An empty slice still yields the header.
pub fn write_records_csv(path: &Path, records: &[BibliographicRecord]) -> Result<()> {
    let mut writer = quoted_writer(path)?;
    writer.write_record(RECORD_COLUMNS)?;
    for record in records {
        writer.write_record(record_row(record)?)?;
    }
    writer.flush()?;
    info!(path = %path.display(), rows = records.len(), "Records exported");
    Ok(())
}

/// Field lookup by header name, so column order in the file does not matter.
struct Row<'a> {
    headers: &'a StringRecord,
    fields: &'a StringRecord,
    line: usize,
}

impl Row<'_> {
    fn get(&self, column: &str) -> Option<String> {
        let idx = self.headers.iter().position(|h| h == column)?;
        self.fields
            .get(idx)
            .filter(|v| !v.is_empty())
            .map(String::from)
    }

    fn date(&self, column: &str) -> Option<NaiveDate> {
        let raw = self.get(column)?;
        let parsed = NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok();
        if parsed.is_none() {
            debug!(line = self.line, column, value = %raw, "Malformed date read as missing");
        }
        parsed
    }

    fn number(&self, column: &str) -> Option<u32> {
        self.get(column)?.trim().parse().ok()
    }

    fn json<T: DeserializeOwned>(&self, column: &str) -> Option<T> {
        let raw = self.get(column)?;
        match serde_json::from_str(&raw) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(line = self.line, column, error = %e, "Malformed list field read as missing");
                None
            }
        }
    }
}

/// Read a records file written by `write_records_csv`.
///
/// Parsing is lenient: malformed dates, numbers and list fields become `None`.
pub fn read_records_csv(path: &Path) -> Result<Vec<BibliographicRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();

    let mut records = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let fields = result?;
        let row = Row { headers: &headers, fields: &fields, line: i + 2 };
        records.push(BibliographicRecord {
            id: row.get("id"),
            doi: row.get("doi"),
            eid: row.get("eid"),
            pii: row.get("pii"),
            pubmed_id: row.get("pubmed_id"),
            title: row.get("title"),
            abstract_text: row.get("abstract"),
            description: row.get("description"),
            publication_date: row.date("publication_date"),
            cited_by_count: row.number("cited_by_count"),
            language: row.get("language"),
            aggregation_type: row.get("aggregation_type"),
            source_type: row.get("source_type"),
            author_keywords: row.json("author_keywords"),
            index_terms: row.json("index_terms"),
            issn: row.get("issn"),
            isbn: row.get("isbn"),
            conference_location: row.get("conference_location"),
            conference_name: row.get("conference_name"),
            publication_name: row.get("publication_name"),
            publisher_address: row.get("publisher_address"),
            issue_title: row.get("issue_title"),
            publisher: row.get("publisher"),
            affiliations: row.json("affiliations"),
            authors: row.json("authors"),
            author_affiliations: row.json("author_affiliations"),
            ref_count: row.number("ref_count"),
            references: row.json("references"),
        });
    }

    debug!(path = %path.display(), rows = records.len(), "Records imported");
    Ok(records)
}

/// Write the two-column `year,count` table.
pub fn write_year_counts_csv(path: &Path, counts: &[YearCount]) -> Result<()> {
    let mut writer = quoted_writer(path)?;
    writer.write_record(YEAR_COUNT_COLUMNS)?;
    for c in counts {
        writer.write_record([c.year.to_string(), c.count.to_string()])?;
    }
    writer.flush()?;
    info!(path = %path.display(), years = counts.len(), "Year counts exported");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Author, Reference};
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn sample() -> BibliographicRecord {
        BibliographicRecord {
            id: Some("SCOPUS_ID:85000000001".into()),
            doi: Some("10.1000/xyz".into()),
            eid: Some("2-s2.0-85000000001".into()),
            title: Some("Mapping \"burned\" areas, again".into()),
            abstract_text: Some("Line one.\nLine two.".into()),
            publication_date: NaiveDate::from_ymd_opt(2018, 5, 31),
            cited_by_count: Some(12),
            aggregation_type: Some("Journal".into()),
            author_keywords: Some(vec!["fire".into(), "MODIS".into()]),
            isbn: Some("9780000000001 9780000000002".into()),
            authors: Some(vec![
                Author { id: Some("1".into()), name: Some("Ana Souza".into()) },
                Author { id: Some("2".into()), name: None },
            ]),
            ref_count: Some(1),
            references: Some(vec![Reference {
                id: Some("r1".into()),
                title: Some("Prior work".into()),
                doi: None,
                authors: Some("Silva J.; Costa M.".into()),
            }]),
            ..Default::default()
        }
    }

    #[test]
    fn test_round_trip_keeps_logical_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out/records.csv");
        let records = vec![sample(), BibliographicRecord::stub("2-s2.0-2")];

        write_records_csv(&path, &records).unwrap();
        let back = read_records_csv(&path).unwrap();

        assert_eq!(back, records);
    }

    #[test]
    fn test_every_field_is_quoted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("records.csv");
        write_records_csv(&path, &[BibliographicRecord::stub("2-s2.0-2")]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("\"id\",\"doi\",\"eid\""));
        let row = lines.next().unwrap();
        assert!(row.starts_with("\"2-s2.0-2\",\"\",\"\",\"\""));
        assert_eq!(row.matches(',').count(), RECORD_COLUMNS.len() - 1);
    }

    #[test]
    fn test_empty_input_writes_header_only() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("records.csv");
        write_records_csv(&path, &[]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(read_records_csv(&path).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_values_read_as_missing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("records.csv");
        std::fs::write(
            &path,
            "\"eid\",\"publication_date\",\"cited_by_count\",\"authors\"\n\
             \"2-s2.0-1\",\"31/05/2018\",\"many\",\"[not json\"\n",
        )
        .unwrap();

        let back = read_records_csv(&path).unwrap();
        assert_eq!(
            back,
            vec![BibliographicRecord { eid: Some("2-s2.0-1".into()), ..Default::default() }]
        );
    }

    #[test]
    fn test_year_counts_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("years.csv");
        write_year_counts_csv(&path, &[YearCount::new(2001, 2), YearCount::new(2003, 1)]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "\"year\",\"count\"\n\"2001\",\"2\"\n\"2003\",\"1\"\n");
    }
}
