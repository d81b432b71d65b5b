use scraper::{Html, Selector};
use tracing::trace;

use super::SearchResult;

/// Provider redirect wrappers. Entries linking through these are noise, not results.
pub const REDIRECT_PREFIX: &str = "//duckduckgo.com/l/?uddg=";

const CONTAINER_SELECTOR: &str = ".result";
const TITLE_LINK_SELECTOR: &str = ".result__title a";
const SNIPPET_SELECTOR: &str = ".result__snippet";

/// Pulls ranked results out of a provider results page.
///
/// Containers are visited in document order. A container is skipped without
/// consuming a rank when its title link is missing, has blank text, has no
/// usable `href`, or points at a redirect wrapper. Ranks are therefore always
/// `1..=n` with no gaps. Markup drift shows up as zero results rather than an
/// error.
#[derive(Debug, Clone)]
pub struct ResultExtractor {
    container: Selector,
    title_link: Selector,
    snippet: Selector,
}

impl Default for ResultExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultExtractor {
    pub fn new() -> Self {
        Self {
            container: selector(CONTAINER_SELECTOR),
            title_link: selector(TITLE_LINK_SELECTOR),
            snippet: selector(SNIPPET_SELECTOR),
        }
    }

    /// Extract at most `max_results` results from `html`.
    pub fn extract(&self, html: &str, max_results: usize) -> Vec<SearchResult> {
        let document = Html::parse_document(html);
        let mut results = Vec::new();

        for container in document.select(&self.container) {
            if results.len() >= max_results {
                break;
            }

            // Title text spans every matched link; the URL comes from the first.
            let mut links = container.select(&self.title_link).peekable();
            let Some(first) = links.peek().copied() else {
                continue;
            };

            let title = links.flat_map(|a| a.text()).collect::<String>().trim().to_string();
            let href = first.value().attr("href").map(str::trim).unwrap_or_default();
            if title.is_empty() || href.is_empty() {
                continue;
            }

            if href.starts_with(REDIRECT_PREFIX) {
                trace!(href, "skipping redirect-wrapped result");
                continue;
            }

            let description: String = container
                .select(&self.snippet)
                .flat_map(|el| el.text())
                .collect();

            results.push(SearchResult {
                title,
                url: href.to_string(),
                description: description.trim().to_string(),
                rank: results.len() + 1,
            });
        }

        results
    }
}

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("hard-coded selector must parse")
}
