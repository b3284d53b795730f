//! Web search provider boundary.
//!
//! The orchestration core depends only on [`SearchProvider`] and the
//! [`SearchResponse`] shape, tolerating missing fields on every hit.
//! [`TavilyClient`] is the bundled implementation; [`RateLimiter`] spaces
//! calls to any provider.

pub mod rate_limit;
pub mod tavily;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::agent::config::ResearchConfig;
use crate::error::SearchError;

pub use rate_limit::RateLimiter;
pub use tavily::TavilyClient;

/// A single search hit. Every field is optional at the provider boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Page title.
    #[serde(default)]
    pub title: Option<String>,
    /// Page URL.
    #[serde(default)]
    pub url: Option<String>,
    /// Short excerpt, when the provider supplies one.
    #[serde(default)]
    pub snippet: Option<String>,
    /// Extracted page content, used when no snippet is present.
    #[serde(default)]
    pub content: Option<String>,
}

/// Search results in provider order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Hits, possibly empty.
    #[serde(default)]
    pub results: Vec<SearchHit>,
}

/// Trait for web search backends.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Provider name (e.g., `"tavily"`).
    fn name(&self) -> &'static str;

    /// Runs a query returning at most `max_results` hits.
    async fn search(&self, query: &str, max_results: u32) -> Result<SearchResponse, SearchError>;
}

/// Creates the configured [`SearchProvider`].
///
/// # Supported Providers
///
/// - `"tavily"` (default)
pub fn create_search_provider(
    config: &ResearchConfig,
) -> Result<Box<dyn SearchProvider>, SearchError> {
    match config.search_provider.as_str() {
        "tavily" => {
            let key = config
                .search_api_key
                .clone()
                .ok_or(SearchError::ApiKeyMissing)?;
            Ok(Box::new(TavilyClient::new(key, config.timeout)?))
        }
        other => Err(SearchError::UnsupportedProvider {
            name: other.to_string(),
        }),
    }
}
