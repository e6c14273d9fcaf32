//! Sequential per-document retrieval.
//!
//! Missing documents are logged and replaced by a stub row; rate limits go
//! through `KeyRotation`; every other failure stops the collection.

use tracing::{debug, info, instrument, warn};

use crate::error::ScopusError;
use crate::extract;
use crate::models::BibliographicRecord;
use crate::retry::KeyRotation;
use crate::sources::AbstractSource;

/// Outcome of one collection run. Records keep the order of the input EIDs.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    pub records: Vec<BibliographicRecord>,
    pub retrieved: usize,
    pub not_found: Vec<String>,
}

pub struct RecordCollector<'a, S: AbstractSource + ?Sized> {
    source: &'a S,
    rotation: &'a mut KeyRotation,
    view: String,
}

impl<'a, S: AbstractSource + ?Sized> RecordCollector<'a, S> {
    pub fn new(source: &'a S, rotation: &'a mut KeyRotation, view: &str) -> Self {
        Self { source, rotation, view: view.to_string() }
    }

    /// Retrieve and flatten one document. A missing document yields a stub record.
    pub async fn fetch_record(&mut self, eid: &str) -> Result<BibliographicRecord, ScopusError> {
        Ok(self
            .fetch(eid)
            .await?
            .unwrap_or_else(|| BibliographicRecord::stub(eid)))
    }

    #[instrument(skip(self))]
    async fn fetch(&mut self, eid: &str) -> Result<Option<BibliographicRecord>, ScopusError> {
        let source = self.source;
        let view = self.view.as_str();
        let result = self
            .rotation
            .run(eid, |key| async move { source.retrieve(eid, view, &key).await })
            .await;

        match result {
            Ok(doc) => Ok(Some(extract::flatten(&doc))),
            Err(ScopusError::NotFound(_)) => {
                warn!(eid, "Document not found, keeping identifier only");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Retrieve every EID in order, one request at a time.
    pub async fn collect(&mut self, eids: &[String]) -> Result<Collection, ScopusError> {
        let mut out = Collection {
            records: Vec::with_capacity(eids.len()),
            ..Default::default()
        };
        self.collect_into(eids, &mut out).await?;
        Ok(out)
    }

    /// Like `collect`, but appends to `out` so the records gathered before a
    /// failure stay available to the caller.
    pub async fn collect_into(&mut self, eids: &[String], out: &mut Collection) -> Result<(), ScopusError> {
        for (i, eid) in eids.iter().enumerate() {
            let record = match self.fetch(eid).await? {
                Some(record) => {
                    out.retrieved += 1;
                    record
                }
                None => {
                    out.not_found.push(eid.clone());
                    BibliographicRecord::stub(eid)
                }
            };
            debug!(n = i + 1, total = eids.len(), eid = %eid, "Record collected");
            out.records.push(record);
        }

        info!(
            retrieved = out.retrieved,
            not_found = out.not_found.len(),
            "Record collection finished"
        );
        Ok(())
    }
}
