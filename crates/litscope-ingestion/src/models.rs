//! Data models for the extraction pipeline.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One retrieved document flattened into a single table row.
///
/// Every field is optional: `None` marks a value the source did not provide.
/// Nested lists are `None` rather than empty when the source list is empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BibliographicRecord {
    pub id: Option<String>,
    pub doi: Option<String>,
    pub eid: Option<String>,
    pub pii: Option<String>,
    pub pubmed_id: Option<String>,
    pub title: Option<String>,
    pub abstract_text: Option<String>,
    pub description: Option<String>,
    pub publication_date: Option<NaiveDate>,
    pub cited_by_count: Option<u32>,
    pub language: Option<String>,
    pub aggregation_type: Option<String>,
    pub source_type: Option<String>,
    pub author_keywords: Option<Vec<String>>,
    pub index_terms: Option<Vec<String>>,
    pub issn: Option<String>,
    pub isbn: Option<String>,

    // Conference and journal
    pub conference_location: Option<String>,
    pub conference_name: Option<String>,
    pub publication_name: Option<String>,
    pub publisher_address: Option<String>,
    pub issue_title: Option<String>,
    pub publisher: Option<String>,

    pub affiliations: Option<Vec<Affiliation>>,
    pub authors: Option<Vec<Author>>,
    pub author_affiliations: Option<Vec<AuthorAffiliation>>,

    pub ref_count: Option<u32>,
    pub references: Option<Vec<Reference>>,
}

impl BibliographicRecord {
    /// Placeholder row for a document the service reported as missing.
    ///
    /// The requested EID goes in `id`, the row's identifier column.
    pub fn stub(eid: &str) -> Self {
        Self {
            id: Some(eid.to_string()),
            ..Self::default()
        }
    }

    /// True when only the identifier is populated.
    pub fn is_stub(&self) -> bool {
        self.id.is_some() && *self == Self::stub(self.id.as_deref().unwrap_or_default())
    }

    pub fn publication_year(&self) -> Option<i32> {
        use chrono::Datelike;
        self.publication_date.map(|d| d.year())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Affiliation {
    pub id: Option<String>,
    pub name: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: Option<String>,
    /// "Given Surname"; only set when both parts are known.
    pub name: Option<String>,
}

/// An author as listed inside one affiliation group of the bibliographic record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthorAffiliation {
    pub id: Option<String>,
    pub name: Option<String>,
    pub affiliation_id: Option<String>,
    pub affiliation: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    pub id: Option<String>,
    pub title: Option<String>,
    pub doi: Option<String>,
    /// Indexed author names joined with "; ".
    pub authors: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stub_has_only_id() {
        let stub = BibliographicRecord::stub("2-s2.0-85000000001");
        assert_eq!(stub.id.as_deref(), Some("2-s2.0-85000000001"));
        assert!(stub.eid.is_none());
        assert!(stub.title.is_none());
        assert!(stub.authors.is_none());
        assert!(stub.is_stub());
    }

    #[test]
    fn test_populated_record_is_not_stub() {
        let mut rec = BibliographicRecord::stub("2-s2.0-1");
        rec.title = Some("A title".into());
        assert!(!rec.is_stub());
        assert!(!BibliographicRecord::default().is_stub());
    }

    #[test]
    fn test_publication_year() {
        let rec = BibliographicRecord {
            publication_date: NaiveDate::from_ymd_opt(2019, 7, 1),
            ..Default::default()
        };
        assert_eq!(rec.publication_year(), Some(2019));
        assert_eq!(BibliographicRecord::default().publication_year(), None);
    }
}
