//! Bibliographic source clients.

pub mod scopus;

use async_trait::async_trait;

use crate::error::ScopusError;

/// One page request of a search; `cursor` is set only for cursor paging.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub start: usize,
    pub count: usize,
    pub cursor: Option<String>,
}

/// One page of search results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPage {
    /// `None` when the response carried no usable result count.
    pub total_results: Option<usize>,
    pub eids: Vec<String>,
    pub next_cursor: Option<String>,
}

/// Paged query interface of a bibliographic search service.
///
/// The API key is an explicit argument so callers decide which credential a
/// request uses.
#[async_trait]
pub trait SearchSource: Send + Sync {
    async fn search_page(
        &self,
        query: &str,
        page: &PageRequest,
        api_key: &str,
    ) -> Result<SearchPage, ScopusError>;
}

/// Per-document retrieval interface.
#[async_trait]
pub trait AbstractSource: Send + Sync {
    /// Fetch the raw document for `eid` at the given detail `view`.
    async fn retrieve(
        &self,
        eid: &str,
        view: &str,
        api_key: &str,
    ) -> Result<serde_json::Value, ScopusError>;
}
