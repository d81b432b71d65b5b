//! Web search: the outbound provider client, HTML result extraction and
//! plain-text rendering of a [`SearchResponse`].

pub mod client;
pub mod extract;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use client::DuckDuckGoClient;
pub use extract::ResultExtractor;

/// A single ranked search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub description: String,
    /// 1-based position in extraction order.
    pub rank: usize,
}

/// Results of one `web_search` call. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SearchResult>,
    pub count: usize,
}

impl SearchResponse {
    pub fn new(query: impl Into<String>, results: Vec<SearchResult>) -> Self {
        Self {
            query: query.into(),
            count: results.len(),
            results,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("failed to create request: {0}")]
    Request(String),
    #[error("failed to perform search: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("search request failed with status: {0}")]
    Status(u16),
    #[error("failed to parse HTML: {0}")]
    Parse(String),
}

/// The capability the protocol core searches through.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, query: &str, max_results: usize) -> Result<SearchResponse, SearchError>;
}

/// Render a response as the text block returned to MCP clients.
pub fn format_search_results(response: &SearchResponse) -> String {
    if response.count == 0 {
        return format!("No results found for query: {}", response.query);
    }

    let mut out = String::new();
    out.push_str(&format!("Search results for: {}\n", response.query));
    out.push_str(&format!("Found {} results:\n\n", response.count));

    for result in &response.results {
        out.push_str(&format!("{}. {}\n", result.rank, result.title));
        out.push_str(&format!("   URL: {}\n", result.url));
        if !result.description.is_empty() {
            out.push_str(&format!("   Description: {}\n", result.description));
        }
        out.push('\n');
    }

    out
}
