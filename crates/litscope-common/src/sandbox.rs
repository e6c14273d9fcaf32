use reqwest::{Client, ClientBuilder};
use std::collections::HashSet;
use std::time::Duration;
use url::Url;
use crate::error::LitscopeError;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// An HTTP client that only sends requests to allow-listed hosts.
///
/// Requests carry an API key header, so the host check runs before the
/// request is built.
#[derive(Debug, Clone)]
pub struct SandboxClient {
    client: Client,
    allowlist: HashSet<String>,
}

impl SandboxClient {
    /// Creates a new SandboxClient with the default allowlist (Elsevier APIs and loopback).
    pub fn new() -> Result<Self, LitscopeError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, LitscopeError> {
        let mut allowlist = HashSet::new();
        let domains = [
            "api.elsevier.com", // Scopus search + abstract retrieval
            "localhost",        // Local mirrors / test servers
            "127.0.0.1",        // Localhost alt
        ];

        for d in domains {
            allowlist.insert(d.to_string());
        }

        let client = ClientBuilder::new()
            .timeout(timeout)
            .user_agent(concat!("litscope/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LitscopeError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, allowlist })
    }

    /// Adds a host (and its subdomains) to the allowlist.
    pub fn allow_domain(&mut self, domain: &str) {
        self.allowlist.insert(domain.to_string());
    }

    /// True when the URL's host is allow-listed or a subdomain of an allow-listed host.
    pub fn is_allowed(&self, url: &str) -> bool {
        let Some(host) = Url::parse(url).ok().and_then(|u| u.host_str().map(str::to_owned)) else {
            return false;
        };
        self.allowlist.iter().any(|allowed| {
            host == *allowed
                || host
                    .strip_suffix(allowed.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }

    /// GET request builder; disallowed hosts are a `Security` error.
    pub fn get(&self, url: &str) -> Result<reqwest::RequestBuilder, LitscopeError> {
        if !self.is_allowed(url) {
            return Err(LitscopeError::Security(format!(
                "domain not in allowlist for URL {}",
                url
            )));
        }

        Ok(self.client.get(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_allowlist() {
        let client = SandboxClient::new().unwrap();
        assert!(client.is_allowed("https://api.elsevier.com/content/search/scopus"));
        assert!(client.is_allowed("http://127.0.0.1:1234/content/abstract/eid/2-s2.0-1"));
        assert!(!client.is_allowed("https://evil.example.com/steal"));
        assert!(!client.is_allowed("not a url"));
    }

    #[test]
    fn test_suffix_match_requires_dot_boundary() {
        let client = SandboxClient::new().unwrap();
        assert!(!client.is_allowed("https://fakeapi.elsevier.com.attacker.net/"));
        assert!(!client.is_allowed("https://notapi.elsevier.com/"));
    }

    #[test]
    fn test_allow_domain() {
        let mut client = SandboxClient::new().unwrap();
        assert!(!client.is_allowed("https://scopus.mirror.org/x"));
        client.allow_domain("mirror.org");
        assert!(client.is_allowed("https://scopus.mirror.org/x"));
    }

    #[test]
    fn test_get_rejects_disallowed_host() {
        let client = SandboxClient::new().unwrap();
        let err = client.get("https://example.org/").unwrap_err();
        assert!(matches!(err, LitscopeError::Security(_)));
    }
}
