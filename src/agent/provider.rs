//! Pluggable LLM provider trait.
//!
//! Implementations translate [`ChatRequest`]/[`ChatResponse`] into
//! provider-specific SDK calls and classify provider overload as
//! [`AgentError::RateLimited`] so the retry layer can recognise it.

use async_trait::async_trait;

use super::message::{ChatRequest, ChatResponse};
use crate::error::AgentError;

/// Trait for LLM provider backends.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name (e.g., `"openai"`, `"gemini"`).
    fn name(&self) -> &'static str;

    /// Executes a chat completion request.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::RateLimited`] on provider overload and
    /// [`AgentError::ApiRequest`] on any other API failure.
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError>;
}
