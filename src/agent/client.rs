//! Provider factory.
//!
//! Maps the configured provider name to a concrete [`LlmProvider`].

use crate::agent::config::ResearchConfig;
use crate::agent::provider::LlmProvider;
use crate::agent::providers::OpenAiProvider;
use crate::error::AgentError;

/// Creates the [`LlmProvider`] named by `config.provider`.
///
/// # Supported Providers
///
/// - `"gemini"` (default): Gemini through its `OpenAI`-compatible endpoint
/// - `"openai"`: `OpenAI`, or any compatible API at `base_url`
///
/// # Errors
///
/// Returns [`AgentError::UnsupportedProvider`] for unknown provider names.
pub fn create_provider(config: &ResearchConfig) -> Result<Box<dyn LlmProvider>, AgentError> {
    match config.provider.as_str() {
        "gemini" => Ok(Box::new(OpenAiProvider::gemini(config))),
        "openai" => Ok(Box::new(OpenAiProvider::new(config))),
        other => Err(AgentError::UnsupportedProvider {
            name: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(provider: &str) -> ResearchConfig {
        ResearchConfig::builder()
            .api_key("test")
            .provider(provider)
            .build()
            .unwrap_or_else(|_| unreachable!())
    }

    #[test]
    fn test_create_known_providers() {
        for name in ["gemini", "openai"] {
            let provider = create_provider(&config(name));
            assert_eq!(provider.map(|p| p.name()).ok(), Some(name));
        }
    }

    #[test]
    fn test_create_unknown_provider() {
        let result = create_provider(&config("unknown"));
        assert!(matches!(
            result,
            Err(AgentError::UnsupportedProvider { ref name }) if name == "unknown"
        ));
    }
}
