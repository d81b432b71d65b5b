#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use websearch_mcp::handlers::Dispatcher;
use websearch_mcp::search::{SearchBackend, SearchError, SearchResponse, SearchResult};
use websearch_mcp::stats::StatsRegistry;
use websearch_mcp::tools::ToolRegistry;

/// What the mock backend answers with.
#[derive(Clone)]
pub enum Canned {
    Results(Vec<(String, String, String)>),
    Status(u16),
}

/// In-memory search backend that records every call.
pub struct MockBackend {
    canned: Canned,
    calls: Mutex<Vec<(String, usize)>>,
}

impl MockBackend {
    pub fn with_results(results: &[(&str, &str, &str)]) -> Arc<Self> {
        Arc::new(Self {
            canned: Canned::Results(
                results
                    .iter()
                    .map(|(t, u, d)| (t.to_string(), u.to_string(), d.to_string()))
                    .collect(),
            ),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(status: u16) -> Arc<Self> {
        Arc::new(Self {
            canned: Canned::Status(status),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<(String, usize)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl SearchBackend for MockBackend {
    async fn search(&self, query: &str, max_results: usize) -> Result<SearchResponse, SearchError> {
        self.calls.lock().push((query.to_string(), max_results));
        match &self.canned {
            Canned::Results(rows) => {
                let results = rows
                    .iter()
                    .take(max_results)
                    .enumerate()
                    .map(|(i, (title, url, description))| SearchResult {
                        title: title.clone(),
                        url: url.clone(),
                        description: description.clone(),
                        rank: i + 1,
                    })
                    .collect();
                Ok(SearchResponse::new(query, results))
            }
            Canned::Status(code) => Err(SearchError::Status(*code)),
        }
    }
}

pub fn dispatcher_with(backend: Arc<MockBackend>) -> (Dispatcher, Arc<StatsRegistry>) {
    let stats = Arc::new(StatsRegistry::new());
    let dispatcher = Dispatcher::new(ToolRegistry::builtin().unwrap(), backend, Arc::clone(&stats));
    (dispatcher, stats)
}

pub fn default_backend() -> Arc<MockBackend> {
    MockBackend::with_results(&[
        ("Rust Programming Language", "https://www.rust-lang.org/", "A language empowering everyone."),
        ("Tokio", "https://tokio.rs/", "An asynchronous runtime for Rust."),
    ])
}

/// A results page shaped like the provider's HTML endpoint.
pub const RESULTS_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>rust at DuckDuckGo</title></head>
<body>
<div id="links" class="results">
  <div class="result results_links results_links_deep web-result">
    <div class="links_main links_deep result__body">
      <h2 class="result__title">
        <a rel="nofollow" class="result__a" href="https://www.rust-lang.org/">Rust Programming Language</a>
      </h2>
      <a class="result__snippet" href="https://www.rust-lang.org/">A language empowering everyone to build <b>reliable</b> software.</a>
    </div>
  </div>
  <div class="result results_links results_links_deep web-result">
    <div class="links_main links_deep result__body">
      <h2 class="result__title">
        <a rel="nofollow" class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fads.example%2F&amp;rut=abc">Sponsored</a>
      </h2>
      <a class="result__snippet">Ad</a>
    </div>
  </div>
  <div class="result results_links results_links_deep web-result">
    <div class="links_main links_deep result__body">
      <h2 class="result__title">
        <a rel="nofollow" class="result__a" href="https://doc.rust-lang.org/book/">The Rust Book</a>
      </h2>
      <a class="result__snippet">Learn Rust.</a>
    </div>
  </div>
  <div class="result results_links results_links_deep web-result">
    <div class="links_main links_deep result__body">
      <h2 class="result__title">
        <a rel="nofollow" class="result__a" href="https://crates.io/">crates.io</a>
      </h2>
    </div>
  </div>
</div>
</body>
</html>
"#;
