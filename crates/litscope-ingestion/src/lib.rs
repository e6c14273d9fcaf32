//! litscope-ingestion — Scopus literature extraction pipeline.
//! - Paged search for document EIDs
//! - Per-document abstract retrieval with API key rotation and bounded backoff
//! - Flattening of nested Scopus records into one tabular row
//! - Fully-quoted CSV export and re-import
//! - Publication counts per year

pub mod aggregate;
pub mod collector;
pub mod error;
pub mod export;
pub mod extract;
pub mod keys;
pub mod models;
pub mod pipeline;
pub mod retry;
pub mod sources;

pub use error::ScopusError;
pub use models::BibliographicRecord;
