//! Research configuration with builder pattern and environment variable support.
//!
//! Configuration is resolved in order: explicit values → environment variables → defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::AgentError;
use crate::search::rate_limit::DEFAULT_MIN_INTERVAL;

/// Default model provider.
const DEFAULT_PROVIDER: &str = "gemini";
/// Default search provider.
const DEFAULT_SEARCH_PROVIDER: &str = "tavily";
/// Default model for light-tier agents.
const DEFAULT_LIGHT_MODEL: &str = "gemini-2.5-flash-lite";
/// Default model for standard-tier agents.
const DEFAULT_STANDARD_MODEL: &str = "gemini-2.5-flash";
/// Default model for advanced-tier agents.
const DEFAULT_ADVANCED_MODEL: &str = "gemini-2.5-pro";
/// Default number of hits per search.
const DEFAULT_SEARCH_MAX_RESULTS: u32 = 5;
/// Default retry attempts for transient provider errors.
const DEFAULT_MAX_RETRIES: u32 = 5;
/// Default base backoff delay in seconds.
const DEFAULT_BASE_DELAY_SECS: u64 = 5;
/// Default orchestrator turn ceiling.
const DEFAULT_MAX_TURNS: usize = 20;
/// Default turn budget for each delegated agent run.
const DEFAULT_DELEGATE_MAX_TURNS: usize = 10;
/// Default ceiling on orchestrator delegations.
const DEFAULT_MAX_EXCHANGES: usize = 7;
/// Default HTTP request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Configuration for a research run.
#[derive(Debug, Clone)]
pub struct ResearchConfig {
    /// Model provider name (`"gemini"` or `"openai"`).
    pub provider: String,
    /// API key for the model provider.
    pub api_key: String,
    /// Optional base URL override (for proxies or compatible APIs).
    pub base_url: Option<String>,
    /// Model used by light-tier agents.
    pub light_model: String,
    /// Model used by standard-tier agents.
    pub standard_model: String,
    /// Model used by advanced-tier agents.
    pub advanced_model: String,
    /// Search provider name.
    pub search_provider: String,
    /// API key for the search provider.
    pub search_api_key: Option<String>,
    /// Minimum spacing between search calls.
    pub search_interval: Duration,
    /// Hits requested per search when the model does not say.
    pub search_max_results: u32,
    /// Attempts before giving up on transient provider errors.
    pub max_retries: u32,
    /// Backoff before the first retry; doubles per attempt.
    pub base_delay: Duration,
    /// Turn ceiling for the orchestrator.
    pub max_turns: usize,
    /// Turn budget for each delegated agent run.
    pub delegate_max_turns: usize,
    /// Hard ceiling on orchestrator delegations.
    pub max_exchanges: usize,
    /// Also wrap delegated agent runs in the retry invoker.
    pub retry_delegations: bool,
    /// HTTP request timeout for provider adapters.
    pub timeout: Duration,
    /// Directory containing prompt template files.
    ///
    /// Missing files fall back to the compiled-in defaults.
    pub prompt_dir: Option<PathBuf>,
}

impl ResearchConfig {
    /// Creates a new builder for `ResearchConfig`.
    #[must_use]
    pub fn builder() -> ResearchConfigBuilder {
        ResearchConfigBuilder::default()
    }

    /// Creates configuration from environment variables with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiKeyMissing`] if no API key is found.
    pub fn from_env() -> Result<Self, AgentError> {
        Self::builder().from_env().build()
    }
}

/// Builder for [`ResearchConfig`].
#[derive(Debug, Clone, Default)]
pub struct ResearchConfigBuilder {
    provider: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
    light_model: Option<String>,
    standard_model: Option<String>,
    advanced_model: Option<String>,
    search_provider: Option<String>,
    search_api_key: Option<String>,
    search_interval: Option<Duration>,
    search_max_results: Option<u32>,
    max_retries: Option<u32>,
    base_delay: Option<Duration>,
    max_turns: Option<usize>,
    delegate_max_turns: Option<usize>,
    max_exchanges: Option<usize>,
    retry_delegations: Option<bool>,
    timeout: Option<Duration>,
    prompt_dir: Option<PathBuf>,
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

impl ResearchConfigBuilder {
    /// Populates unset fields from environment variables.
    #[must_use]
    pub fn from_env(mut self) -> Self {
        if self.provider.is_none() {
            self.provider = std::env::var("RESEARCH_PROVIDER").ok();
        }
        if self.api_key.is_none() {
            self.api_key = ["GEMINI_API_KEY", "RESEARCH_API_KEY"]
                .into_iter()
                .find_map(|name| std::env::var(name).ok().filter(|k| !k.is_empty()));
        }
        if self.base_url.is_none() {
            self.base_url = std::env::var("RESEARCH_BASE_URL").ok();
        }
        if self.light_model.is_none() {
            self.light_model = std::env::var("RESEARCH_LIGHT_MODEL").ok();
        }
        if self.standard_model.is_none() {
            self.standard_model = std::env::var("RESEARCH_STANDARD_MODEL").ok();
        }
        if self.advanced_model.is_none() {
            self.advanced_model = std::env::var("RESEARCH_ADVANCED_MODEL").ok();
        }
        if self.search_api_key.is_none() {
            self.search_api_key = std::env::var("TAVILY_API_KEY")
                .ok()
                .filter(|k| !k.is_empty());
        }
        if self.max_turns.is_none() {
            self.max_turns = env_parse("RESEARCH_MAX_TURNS");
        }
        if self.max_retries.is_none() {
            self.max_retries = env_parse("RESEARCH_MAX_RETRIES");
        }
        if self.prompt_dir.is_none() {
            self.prompt_dir = std::env::var("RESEARCH_PROMPT_DIR")
                .ok()
                .map(PathBuf::from);
        }
        self
    }

    /// Sets the model provider name.
    #[must_use]
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Sets the model provider API key.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the base URL override.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the light-tier model.
    #[must_use]
    pub fn light_model(mut self, model: impl Into<String>) -> Self {
        self.light_model = Some(model.into());
        self
    }

    /// Sets the standard-tier model.
    #[must_use]
    pub fn standard_model(mut self, model: impl Into<String>) -> Self {
        self.standard_model = Some(model.into());
        self
    }

    /// Sets the advanced-tier model.
    #[must_use]
    pub fn advanced_model(mut self, model: impl Into<String>) -> Self {
        self.advanced_model = Some(model.into());
        self
    }

    /// Sets the search provider name.
    #[must_use]
    pub fn search_provider(mut self, provider: impl Into<String>) -> Self {
        self.search_provider = Some(provider.into());
        self
    }

    /// Sets the search provider API key.
    #[must_use]
    pub fn search_api_key(mut self, key: impl Into<String>) -> Self {
        self.search_api_key = Some(key.into());
        self
    }

    /// Sets the minimum spacing between search calls.
    #[must_use]
    pub const fn search_interval(mut self, interval: Duration) -> Self {
        self.search_interval = Some(interval);
        self
    }

    /// Sets the default hits per search.
    #[must_use]
    pub const fn search_max_results(mut self, n: u32) -> Self {
        self.search_max_results = Some(n);
        self
    }

    /// Sets the max retries.
    #[must_use]
    pub const fn max_retries(mut self, n: u32) -> Self {
        self.max_retries = Some(n);
        self
    }

    /// Sets the base backoff delay.
    #[must_use]
    pub const fn base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = Some(delay);
        self
    }

    /// Sets the orchestrator turn ceiling.
    #[must_use]
    pub const fn max_turns(mut self, n: usize) -> Self {
        self.max_turns = Some(n);
        self
    }

    /// Sets the turn budget of each delegated agent run.
    #[must_use]
    pub const fn delegate_max_turns(mut self, n: usize) -> Self {
        self.delegate_max_turns = Some(n);
        self
    }

    /// Sets the delegation ceiling.
    #[must_use]
    pub const fn max_exchanges(mut self, n: usize) -> Self {
        self.max_exchanges = Some(n);
        self
    }

    /// Wraps delegated agent runs in the retry invoker too.
    #[must_use]
    pub const fn retry_delegations(mut self, enabled: bool) -> Self {
        self.retry_delegations = Some(enabled);
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Sets the prompt template directory.
    #[must_use]
    pub fn prompt_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.prompt_dir = Some(dir.into());
        self
    }

    /// Builds the [`ResearchConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiKeyMissing`] if no API key was set.
    pub fn build(mut self) -> Result<ResearchConfig, AgentError> {
        let api_key = self.api_key.take().ok_or(AgentError::ApiKeyMissing)?;
        Ok(self.finish(api_key))
    }

    /// Builds a [`ResearchConfig`] for search-only use.
    ///
    /// The model API key may be absent; it is left empty.
    #[must_use]
    pub fn build_for_search(mut self) -> ResearchConfig {
        let api_key = self.api_key.take().unwrap_or_default();
        self.finish(api_key)
    }

    fn finish(self, api_key: String) -> ResearchConfig {
        ResearchConfig {
            provider: self
                .provider
                .unwrap_or_else(|| DEFAULT_PROVIDER.to_string()),
            api_key,
            base_url: self.base_url,
            light_model: self
                .light_model
                .unwrap_or_else(|| DEFAULT_LIGHT_MODEL.to_string()),
            standard_model: self
                .standard_model
                .unwrap_or_else(|| DEFAULT_STANDARD_MODEL.to_string()),
            advanced_model: self
                .advanced_model
                .unwrap_or_else(|| DEFAULT_ADVANCED_MODEL.to_string()),
            search_provider: self
                .search_provider
                .unwrap_or_else(|| DEFAULT_SEARCH_PROVIDER.to_string()),
            search_api_key: self.search_api_key,
            search_interval: self
                .search_interval
                .unwrap_or(DEFAULT_MIN_INTERVAL),
            search_max_results: self
                .search_max_results
                .filter(|&n| n > 0)
                .unwrap_or(DEFAULT_SEARCH_MAX_RESULTS),
            max_retries: self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            base_delay: self
                .base_delay
                .unwrap_or(Duration::from_secs(DEFAULT_BASE_DELAY_SECS)),
            max_turns: self.max_turns.unwrap_or(DEFAULT_MAX_TURNS),
            delegate_max_turns: self
                .delegate_max_turns
                .unwrap_or(DEFAULT_DELEGATE_MAX_TURNS),
            max_exchanges: self.max_exchanges.unwrap_or(DEFAULT_MAX_EXCHANGES),
            retry_delegations: self.retry_delegations.unwrap_or(false),
            timeout: self
                .timeout
                .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            prompt_dir: self.prompt_dir,
        }
    }
}
