//! The agent invocation boundary.
//!
//! [`AgentRunner`] runs one agent on one prompt under a turn budget.
//! [`LlmRunner`] is the production implementation: it drives the agentic
//! loop against an [`LlmProvider`], choosing the model from the agent's
//! tier. Delegated agents are run on the same runner.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use super::agentic_loop;
use super::config::ResearchConfig;
use super::message::TokenUsage;
use super::provider::LlmProvider;
use super::spec::{AgentSpec, ModelTier};
use crate::error::AgentError;

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The model answered without calling a tool.
    Completed,
    /// The policy's terminal tool returned.
    TerminalTool,
    /// The turn budget ran out; the output is best effort.
    TurnLimit,
}

/// One delegation performed during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Exchange {
    /// Exposed name of the delegated tool.
    pub tool: String,
    /// Whether the delegation failed.
    pub is_error: bool,
}

/// Outcome of a single agent run.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Final text; never empty on the turn-limit path.
    pub final_output: String,
    /// Model calls made.
    pub turns_used: usize,
    /// Why the run stopped.
    pub stop: StopReason,
    /// Delegations in call order.
    pub exchanges: Vec<Exchange>,
    /// Token usage summed over every turn.
    pub usage: TokenUsage,
}

/// Runs an agent to completion.
#[async_trait]
pub trait AgentRunner: Send + Sync {
    /// Runs `agent` on `prompt`, making at most `max_turns` model calls.
    ///
    /// # Errors
    ///
    /// Returns the provider's error when a model call fails; transient
    /// errors are left for the caller's retry layer.
    async fn run(
        &self,
        agent: &AgentSpec,
        prompt: &str,
        max_turns: usize,
    ) -> Result<RunResult, AgentError>;
}

/// Model names per tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierModels {
    /// Light-tier model.
    pub light: String,
    /// Standard-tier model.
    pub standard: String,
    /// Advanced-tier model.
    pub advanced: String,
}

impl TierModels {
    /// Copies the tier models out of `config`.
    #[must_use]
    pub fn from_config(config: &ResearchConfig) -> Self {
        Self {
            light: config.light_model.clone(),
            standard: config.standard_model.clone(),
            advanced: config.advanced_model.clone(),
        }
    }

    /// Model for `tier`.
    #[must_use]
    pub fn get(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Light => &self.light,
            ModelTier::Standard => &self.standard,
            ModelTier::Advanced => &self.advanced,
        }
    }
}

/// [`AgentRunner`] backed by an LLM provider.
pub struct LlmRunner {
    provider: Arc<dyn LlmProvider>,
    models: TierModels,
}

impl LlmRunner {
    /// Creates a runner.
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>, models: TierModels) -> Self {
        Self { provider, models }
    }
}

impl std::fmt::Debug for LlmRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmRunner")
            .field("provider", &self.provider.name())
            .field("models", &self.models)
            .finish()
    }
}

#[async_trait]
impl AgentRunner for LlmRunner {
    async fn run(
        &self,
        agent: &AgentSpec,
        prompt: &str,
        max_turns: usize,
    ) -> Result<RunResult, AgentError> {
        let model = self.models.get(agent.tier);
        agentic_loop::run_agent(self.provider.as_ref(), self, model, agent, prompt, max_turns).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_models_from_config() {
        let config = ResearchConfig::builder()
            .api_key("key")
            .light_model("small")
            .build()
            .unwrap_or_else(|_| unreachable!());
        let models = TierModels::from_config(&config);
        assert_eq!(models.get(ModelTier::Light), "small");
        assert_eq!(models.get(ModelTier::Standard), "gemini-2.5-flash");
        assert_eq!(models.get(ModelTier::Advanced), "gemini-2.5-pro");
    }

    #[test]
    fn test_stop_reason_serialization() {
        let json = serde_json::to_string(&StopReason::TurnLimit).unwrap_or_default();
        assert_eq!(json, "\"turn_limit\"");
    }
}
