//! Error types for deep-research.
//!
//! Errors are split by layer: [`AgentError`] for model invocation and
//! orchestration, [`SearchError`] for the search provider adapter, and
//! [`CommandError`] for the CLI. [`Error`] unifies them for callers that
//! only need one type.

use thiserror::Error;

/// Markers in a provider error message that indicate quota exhaustion.
const QUOTA_MARKERS: [&str; 2] = ["RESOURCE_EXHAUSTED", "429"];

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Model invocation or orchestration failure.
    #[error(transparent)]
    Agent(#[from] AgentError),

    /// Search provider failure.
    #[error(transparent)]
    Search(#[from] SearchError),

    /// CLI command failure.
    #[error(transparent)]
    Command(#[from] CommandError),
}

/// Errors raised while invoking agents or driving the orchestration loop.
#[derive(Debug, Error)]
pub enum AgentError {
    /// No API key was configured for the model provider.
    #[error("no model provider API key configured (set GEMINI_API_KEY or RESEARCH_API_KEY)")]
    ApiKeyMissing,

    /// The configured provider name is not known.
    #[error("unsupported provider: {name}")]
    UnsupportedProvider {
        /// Provider name as configured.
        name: String,
    },

    /// The provider signalled a rate limit.
    #[error("rate limited by provider: {message}")]
    RateLimited {
        /// Provider message.
        message: String,
    },

    /// The provider request failed.
    #[error("API request failed: {message}")]
    ApiRequest {
        /// Provider message.
        message: String,
        /// HTTP status code, when known.
        status: Option<u16>,
    },

    /// A tool invocation itself was broken (bad arguments, unknown tool,
    /// failed delegated agent).
    #[error("tool '{name}' failed: {message}")]
    ToolExecution {
        /// Tool or delegated agent name.
        name: String,
        /// Failure description.
        message: String,
    },

    /// Every retry attempt failed with a transient error.
    #[error("Too many retries, giving up.")]
    RetryExhausted {
        /// Number of attempts made.
        attempts: u32,
    },

    /// The orchestrator rejected the request or could not run it.
    #[error("orchestration error: {message}")]
    Orchestration {
        /// Failure description.
        message: String,
    },
}

impl AgentError {
    /// Returns `true` for temporary provider overload that is worth
    /// retrying after a backoff.
    ///
    /// A dedicated [`AgentError::RateLimited`] always qualifies; any other
    /// error qualifies when its message carries a quota-exhaustion marker
    /// (`RESOURCE_EXHAUSTED` or `429`).
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RateLimited { .. } => true,
            Self::ApiRequest {
                status: Some(429), ..
            } => true,
            Self::RetryExhausted { .. } | Self::ApiKeyMissing => false,
            other => is_quota_message(&other.to_string()),
        }
    }
}

/// Returns `true` if `message` carries a quota-exhaustion marker.
#[must_use]
pub fn is_quota_message(message: &str) -> bool {
    QUOTA_MARKERS.iter().any(|marker| message.contains(marker))
}

/// Errors raised by the search provider adapter.
#[derive(Debug, Error)]
pub enum SearchError {
    /// No search API key was configured.
    #[error("no search API key configured (set TAVILY_API_KEY)")]
    ApiKeyMissing,

    /// Transport-level failure.
    #[error("search request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("search provider returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// The provider response could not be decoded.
    #[error("invalid search response: {0}")]
    Decode(String),

    /// Provider-specific failure, reported verbatim.
    #[error("{0}")]
    Provider(String),

    /// The configured search provider name is not known.
    #[error("unsupported search provider: {name}")]
    UnsupportedProvider {
        /// Provider name as configured.
        name: String,
    },
}

/// Errors raised by CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The command could not complete.
    #[error("{0}")]
    ExecutionFailed(String),

    /// Output could not be rendered in the requested format.
    #[error("output formatting failed: {0}")]
    OutputFormat(String),

    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(AgentError::RateLimited { message: "slow down".into() }, true; "dedicated rate limit")]
    #[test_case(AgentError::ApiRequest { message: "status RESOURCE_EXHAUSTED".into(), status: None }, true; "quota marker")]
    #[test_case(AgentError::ApiRequest { message: "HTTP 429 Too Many Requests".into(), status: None }, true; "http 429 text")]
    #[test_case(AgentError::ApiRequest { message: "too many".into(), status: Some(429) }, true; "http 429 status")]
    #[test_case(AgentError::ApiRequest { message: "invalid api key".into(), status: Some(401) }, false; "auth failure")]
    #[test_case(AgentError::Orchestration { message: "bad request".into() }, false; "orchestration")]
    #[test_case(AgentError::RetryExhausted { attempts: 5 }, false; "exhausted")]
    fn test_is_transient(err: AgentError, expected: bool) {
        assert_eq!(err.is_transient(), expected);
    }

    #[test]
    fn test_retry_exhausted_message_is_fixed() {
        let err = AgentError::RetryExhausted { attempts: 5 };
        assert_eq!(err.to_string(), "Too many retries, giving up.");
    }

    #[test]
    fn test_tool_execution_names_the_tool() {
        let err = AgentError::ToolExecution {
            name: "PlanningAgent".into(),
            message: "bad gateway".into(),
        };
        assert!(err.to_string().contains("PlanningAgent"));
    }

    #[test]
    fn test_error_from_agent_error() {
        let err: Error = AgentError::ApiKeyMissing.into();
        assert!(matches!(err, Error::Agent(AgentError::ApiKeyMissing)));
    }
}
