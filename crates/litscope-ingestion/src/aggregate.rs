//! Publication counts per year.

use std::collections::BTreeMap;

use litscope_common::YearCount;
use tracing::debug;

use crate::models::BibliographicRecord;

/// Count records of `publication_type` per publication year, ascending by year.
///
/// Records of other aggregation types and records without a publication date
/// are left out.
pub fn count_by_year(records: &[BibliographicRecord], publication_type: &str) -> Vec<YearCount> {
    let mut by_year: BTreeMap<i32, usize> = BTreeMap::new();
    let mut undated = 0usize;

    for record in records
        .iter()
        .filter(|r| r.aggregation_type.as_deref() == Some(publication_type))
    {
        match record.publication_year() {
            Some(year) => *by_year.entry(year).or_insert(0) += 1,
            None => undated += 1,
        }
    }

    if undated > 0 {
        debug!(undated, publication_type, "Records without a publication date skipped");
    }

    by_year
        .into_iter()
        .map(|(year, count)| YearCount::new(year, count))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(kind: &str, year: Option<i32>) -> BibliographicRecord {
        BibliographicRecord {
            aggregation_type: Some(kind.to_string()),
            publication_date: year.and_then(|y| NaiveDate::from_ymd_opt(y, 3, 15)),
            ..Default::default()
        }
    }

    #[test]
    fn test_counts_sorted_by_year() {
        let records = vec![
            record("Journal", Some(2003)),
            record("Journal", Some(2001)),
            record("Journal", Some(2001)),
        ];
        assert_eq!(
            count_by_year(&records, "Journal"),
            vec![YearCount::new(2001, 2), YearCount::new(2003, 1)]
        );
    }

    #[test]
    fn test_other_types_and_undated_are_excluded() {
        let records = vec![
            record("Journal", Some(2010)),
            record("Conference Proceeding", Some(2010)),
            record("Journal", None),
            BibliographicRecord::stub("2-s2.0-1"),
        ];
        assert_eq!(count_by_year(&records, "Journal"), vec![YearCount::new(2010, 1)]);
        assert_eq!(
            count_by_year(&records, "Conference Proceeding"),
            vec![YearCount::new(2010, 1)]
        );
    }

    #[test]
    fn test_no_matching_records() {
        assert!(count_by_year(&[], "Journal").is_empty());
    }
}
