//! Scopus (Elsevier) API client.
//!
//! Endpoints used:
//!   search:   {base}/content/search/scopus
//!   abstract: {base}/content/abstract/eid/{eid}?view=...
//!
//! Authentication is the `X-ELS-APIKey` header; the key is supplied per call.

use async_trait::async_trait;
use litscope_common::sandbox::SandboxClient as Client;
use litscope_config::ScopusConfig;
use reqwest::header::{ACCEPT, RETRY_AFTER};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::{AbstractSource, PageRequest, SearchPage, SearchSource};
use crate::error::ScopusError;
use crate::retry::KeyRotation;

const API_KEY_HEADER: &str = "X-ELS-APIKey";

/// Scopus refuses `start` offsets past this point for non-subscribers.
pub const NON_SUBSCRIBER_RESULT_LIMIT: usize = 5000;

pub struct ScopusClient {
    client: Client,
    base_url: String,
}

impl ScopusClient {
    pub fn new(config: &ScopusConfig) -> Result<Self, ScopusError> {
        let client = Client::with_timeout(config.timeout())?;
        Ok(Self::with_client(client, &config.base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn search_url(&self) -> String {
        format!("{}/content/search/scopus", self.base_url)
    }

    fn abstract_url(&self, eid: &str) -> String {
        format!("{}/content/abstract/eid/{}", self.base_url, eid)
    }
}

#[async_trait]
impl SearchSource for ScopusClient {
    #[instrument(skip(self, api_key))]
    async fn search_page(
        &self,
        query: &str,
        page: &PageRequest,
        api_key: &str,
    ) -> Result<SearchPage, ScopusError> {
        let mut params = vec![
            ("query", query.to_string()),
            ("count", page.count.to_string()),
            ("field", "eid".to_string()),
        ];
        match &page.cursor {
            Some(cursor) => params.push(("cursor", cursor.clone())),
            None => params.push(("start", page.start.to_string())),
        }

        let resp = self.client
            .get(&self.search_url())?
            .header(API_KEY_HEADER, api_key)
            .header(ACCEPT, "application/json")
            .query(&params)
            .send()
            .await?;

        let body: Value = check_response(resp, query).await?.json().await?;
        let page = parse_search_page(&body)?;
        debug!(n = page.eids.len(), total = page.total_results, "Scopus search page");
        Ok(page)
    }
}

#[async_trait]
impl AbstractSource for ScopusClient {
    #[instrument(skip(self, api_key))]
    async fn retrieve(&self, eid: &str, view: &str, api_key: &str) -> Result<Value, ScopusError> {
        let resp = self.client
            .get(&self.abstract_url(eid))?
            .header(API_KEY_HEADER, api_key)
            .header(ACCEPT, "application/json")
            .query(&[("view", view)])
            .send()
            .await?;

        let body: Value = check_response(resp, eid).await?.json().await?;
        if body.get("abstracts-retrieval-response").is_none() {
            return Err(ScopusError::Parse(format!(
                "missing abstracts-retrieval-response for {eid}"
            )));
        }
        Ok(body)
    }
}

/// Map the status codes Scopus uses for missing documents and exhausted quotas.
async fn check_response(resp: reqwest::Response, what: &str) -> Result<reqwest::Response, ScopusError> {
    let status = resp.status();
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(ScopusError::NotFound(what.to_string()));
    }
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(ScopusError::RateLimited {
            retry_after_secs: parse_retry_after(&resp),
        });
    }
    if !status.is_success() {
        return Err(ScopusError::Api {
            status: status.as_u16(),
            message: resp.text().await.unwrap_or_default(),
        });
    }
    Ok(resp)
}

fn parse_retry_after(resp: &reqwest::Response) -> Option<u64> {
    resp.headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
}

/// Parse one `search-results` page. An empty result set is reported by
/// Scopus as a single entry carrying an `error` member.
fn parse_search_page(body: &Value) -> Result<SearchPage, ScopusError> {
    let results = body
        .get("search-results")
        .ok_or_else(|| ScopusError::Parse("missing search-results".into()))?;

    let total_results = match &results["opensearch:totalResults"] {
        Value::String(s) => s.trim().parse::<usize>().ok(),
        Value::Number(n) => n.as_u64().map(|n| n as usize),
        _ => None,
    };

    let eids = results["entry"]
        .as_array()
        .map(|entries| {
            entries
                .iter()
                .filter(|e| e.get("error").is_none())
                .filter_map(|e| e["eid"].as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default();

    let next_cursor = results["cursor"]["@next"].as_str().map(String::from);

    Ok(SearchPage { total_results, eids, next_cursor })
}

// ── Paged search ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub page_size: usize,
    pub subscriber: bool,
    pub max_entries: Option<usize>,
}

impl From<&ScopusConfig> for SearchOptions {
    fn from(config: &ScopusConfig) -> Self {
        Self {
            page_size: config.page_size,
            subscriber: config.subscriber,
            max_entries: config.max_entries,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResults {
    pub total_results: usize,
    pub eids: Vec<String>,
}

/// Walk every page of `query` and collect the EIDs, honouring `max_entries`.
///
/// Subscribers page with cursors; everyone else pages with `start` offsets up
/// to `NON_SUBSCRIBER_RESULT_LIMIT`, shrinking the last page to stay inside it.
/// Without a result count from the service, paging runs until an empty page.
#[instrument(skip(source, rotation, options))]
pub async fn search_all<S: SearchSource + ?Sized>(
    source: &S,
    rotation: &mut KeyRotation,
    query: &str,
    options: &SearchOptions,
) -> Result<SearchResults, ScopusError> {
    let mut results = SearchResults::default();
    let mut total: Option<usize> = None;
    let mut request = PageRequest {
        start: 0,
        count: page_count(options, 0),
        cursor: options.subscriber.then(|| "*".to_string()),
    };

    loop {
        let req = &request;
        let page = rotation
            .run("search", |key| async move { source.search_page(query, req, &key).await })
            .await?;

        match page.total_results {
            Some(n) => total = Some(n),
            None if total.is_none() && results.eids.is_empty() => {
                warn!("Search response has no usable opensearch:totalResults, paging until an empty page");
            }
            None => {}
        }
        let n_page = page.eids.len();
        if n_page == 0 {
            break;
        }
        results.eids.extend(page.eids);

        if let Some(max) = options.max_entries {
            if results.eids.len() >= max {
                results.eids.truncate(max);
                break;
            }
        }
        if total.is_some_and(|t| results.eids.len() >= t) {
            break;
        }

        if options.subscriber {
            match page.next_cursor {
                Some(next) if request.cursor.as_deref() != Some(next.as_str()) => {
                    request.cursor = Some(next);
                }
                _ => break,
            }
        } else {
            request.start += n_page;
            if request.start >= NON_SUBSCRIBER_RESULT_LIMIT {
                warn!(
                    total = ?total,
                    fetched = results.eids.len(),
                    "Non-subscriber search stops at {} results",
                    NON_SUBSCRIBER_RESULT_LIMIT
                );
                break;
            }
            request.count = page_count(options, request.start);
        }
    }

    results.total_results = total.unwrap_or(results.eids.len());
    Ok(results)
}

/// Page size for a request at `start`; offset pages never reach past the
/// non-subscriber limit.
fn page_count(options: &SearchOptions, start: usize) -> usize {
    if options.subscriber {
        options.page_size
    } else {
        options.page_size.min(NON_SUBSCRIBER_RESULT_LIMIT.saturating_sub(start))
    }
}
