use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE};
use reqwest::StatusCode;
use tracing::{debug, warn};
use url::Url;

use super::{ResultExtractor, SearchBackend, SearchError, SearchResponse};

/// HTML endpoint of the search provider.
pub const DEFAULT_ENDPOINT: &str = "https://html.duckduckgo.com/html/";

/// Default bound on a single search round-trip (30 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
const BROWSER_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const BROWSER_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.5";

/// Searches the DuckDuckGo HTML endpoint and extracts results from the page.
///
/// One request per call: no caching, no retries.
#[derive(Debug, Clone)]
pub struct DuckDuckGoClient {
    http: reqwest::Client,
    endpoint: String,
    extractor: ResultExtractor,
}

impl DuckDuckGoClient {
    /// Build a client against `endpoint` with a per-request `timeout`.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, SearchError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(BROWSER_USER_AGENT)
            .build()
            .map_err(|e| SearchError::Request(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
            extractor: ResultExtractor::new(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Endpoint with the query attached as a percent-encoded `q` parameter.
    pub fn search_url(&self, query: &str) -> Result<Url, SearchError> {
        Url::parse_with_params(&self.endpoint, &[("q", query)])
            .map_err(|e| SearchError::Request(format!("invalid endpoint {}: {e}", self.endpoint)))
    }
}

#[async_trait]
impl SearchBackend for DuckDuckGoClient {
    async fn search(&self, query: &str, max_results: usize) -> Result<SearchResponse, SearchError> {
        let url = self.search_url(query)?;
        debug!(%url, max_results, "issuing search");

        let response = self
            .http
            .get(url)
            .header(ACCEPT, BROWSER_ACCEPT)
            .header(ACCEPT_LANGUAGE, BROWSER_ACCEPT_LANGUAGE)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "search transport failure");
                SearchError::Transport(e)
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(status = status.as_u16(), "search provider returned non-200");
            return Err(SearchError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SearchError::Parse(format!("reading body: {e}")))?;

        let results = self.extractor.extract(&body, max_results);
        debug!(count = results.len(), "search completed");

        Ok(SearchResponse::new(query, results))
    }
}
