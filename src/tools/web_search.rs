//! Rate-limited `web_search` tool.
//!
//! Every call waits on the shared [`RateLimiter`] before reaching the
//! provider. Provider failures never escape as errors: the model receives a
//! `WebSearchTool failed: ...` text instead and can carry on.

use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::agent::tool::{NativeTool, ToolDefinition, ToolOutput};
use crate::error::AgentError;
use crate::search::{RateLimiter, SearchProvider, SearchResponse};

/// Exposed tool name.
pub const TOOL_NAME: &str = "web_search";
/// Hits requested when the caller does not say.
pub const DEFAULT_MAX_RESULTS: u32 = 5;
/// Returned when the provider finds nothing.
pub const NO_RESULTS: &str = "No results found.";

const NO_TITLE: &str = "No Title";
const NO_URL: &str = "No URL";
const NO_SNIPPET: &str = "No snippet available";

#[derive(Deserialize)]
struct SearchArgs {
    query: String,
    #[serde(default)]
    max_results: Option<u32>,
}

/// Web search behind a process-wide rate limiter.
#[derive(Clone)]
pub struct WebSearchTool {
    provider: Arc<dyn SearchProvider>,
    limiter: Arc<RateLimiter>,
    default_max_results: u32,
}

impl WebSearchTool {
    /// Creates a tool over `provider`, throttled by `limiter`.
    #[must_use]
    pub fn new(provider: Arc<dyn SearchProvider>, limiter: Arc<RateLimiter>) -> Self {
        Self {
            provider,
            limiter,
            default_max_results: DEFAULT_MAX_RESULTS,
        }
    }

    /// Overrides the hit count used when the caller passes none or zero.
    #[must_use]
    pub fn with_default_max_results(mut self, n: u32) -> Self {
        if n > 0 {
            self.default_max_results = n;
        }
        self
    }

    /// Runs one throttled search and formats the hits.
    ///
    /// A zero `max_results` falls back to the default.
    pub async fn search(&self, query: &str, max_results: u32) -> ToolOutput {
        let max_results = if max_results == 0 {
            self.default_max_results
        } else {
            max_results
        };

        self.limiter.acquire().await;
        debug!(provider = self.provider.name(), query, max_results, "web search");

        match self.provider.search(query, max_results).await {
            Ok(response) => {
                debug!(?response, "raw search response");
                ToolOutput::Text(format_results(&response))
            }
            Err(e) => {
                warn!(provider = self.provider.name(), error = %e, "web search failed");
                ToolOutput::Failure(format!("WebSearchTool failed: {e}"))
            }
        }
    }
}

impl std::fmt::Debug for WebSearchTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebSearchTool")
            .field("provider", &self.provider.name())
            .field("limiter", &self.limiter)
            .field("default_max_results", &self.default_max_results)
            .finish()
    }
}

#[async_trait]
impl NativeTool for WebSearchTool {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: TOOL_NAME.to_string(),
            description: "Search the web. Returns one line per result with title, URL and \
                          snippet. Rate-limited to 10 calls per minute."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Search query."
                    },
                    "max_results": {
                        "type": "integer",
                        "description": "Maximum number of results. Defaults to 5.",
                        "default": DEFAULT_MAX_RESULTS
                    }
                },
                "required": ["query"],
                "additionalProperties": false
            }),
        }
    }

    async fn call(&self, arguments: &str) -> Result<ToolOutput, AgentError> {
        let args: SearchArgs =
            serde_json::from_str(arguments).map_err(|e| AgentError::ToolExecution {
                name: TOOL_NAME.to_string(),
                message: format!("invalid arguments: {e}"),
            })?;

        Ok(self
            .search(&args.query, args.max_results.unwrap_or(0))
            .await)
    }
}

/// Formats hits as `- {title} ({url}): {snippet}`, one per line, in
/// provider order.
///
/// Missing fields get placeholders; an empty snippet falls back to the
/// hit's content.
#[must_use]
pub fn format_results(response: &SearchResponse) -> String {
    if response.results.is_empty() {
        return NO_RESULTS.to_string();
    }

    let mut out = String::new();
    for (i, hit) in response.results.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let snippet = hit
            .snippet
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| hit.content.as_deref().filter(|c| !c.is_empty()))
            .unwrap_or(NO_SNIPPET);
        let _ = write!(
            out,
            "- {} ({}): {snippet}",
            hit.title.as_deref().unwrap_or(NO_TITLE),
            hit.url.as_deref().unwrap_or(NO_URL),
        );
    }
    out
}
