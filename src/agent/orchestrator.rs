//! Top-level research orchestration.
//!
//! Validates the request, runs the orchestrator agent through the
//! [`RetryingInvoker`] and packages the outcome as a [`ResearchReport`].

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::config::ResearchConfig;
use super::message::TokenUsage;
use super::phase::ResearchPhase;
use super::prompt::PromptSet;
use super::provider::LlmProvider;
use super::retry::{RetryPolicy, RetryingInvoker};
use super::roles::{AgentRegistry, RegistryTools};
use super::runner::{AgentRunner, Exchange, LlmRunner, StopReason, TierModels};
use super::tool::ToolRef;
use crate::clock::Clock;
use crate::error::AgentError;
use crate::search::{RateLimiter, SearchProvider};
use crate::tools::{CurrentDateTool, WebSearchTool};

/// Longest accepted request, in bytes.
pub const MAX_REQUEST_LEN: usize = 10_000;

/// Whether the report is the workflow's intended output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The orchestrator finished on its own.
    Completed,
    /// The turn budget ran out; the text is best effort.
    Degraded,
}

/// Result of a research run.
#[derive(Debug, Clone, Serialize)]
pub struct ResearchReport {
    /// Report text. Never empty.
    pub text: String,
    /// Completed or degraded.
    pub outcome: Outcome,
    /// Why the orchestrator stopped.
    pub stop: StopReason,
    /// Orchestrator turns used.
    pub turns_used: usize,
    /// Delegations in call order.
    pub exchanges: Vec<Exchange>,
    /// Phases visited.
    pub phases: Vec<ResearchPhase>,
    /// Orchestrator token usage.
    pub usage: TokenUsage,
    /// Wall time in seconds, retries included.
    pub elapsed_secs: f64,
}

/// Runs research requests end to end.
pub struct Orchestrator {
    runner: Arc<dyn AgentRunner>,
    invoker: RetryingInvoker,
    registry: AgentRegistry,
    clock: Arc<dyn Clock>,
    max_turns: usize,
}

impl Orchestrator {
    /// Creates an orchestrator from prebuilt parts.
    #[must_use]
    pub fn new(
        runner: Arc<dyn AgentRunner>,
        invoker: RetryingInvoker,
        registry: AgentRegistry,
        clock: Arc<dyn Clock>,
        max_turns: usize,
    ) -> Self {
        Self {
            runner,
            invoker,
            registry,
            clock,
            max_turns,
        }
    }

    /// Wires the full topology from configuration.
    ///
    /// `limiter` is the process-wide search throttle. Orchestrators in
    /// the same process must be handed the same instance.
    #[must_use]
    pub fn from_config(
        config: &ResearchConfig,
        provider: Arc<dyn LlmProvider>,
        search: Arc<dyn SearchProvider>,
        limiter: Arc<RateLimiter>,
        prompts: &PromptSet,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let web_search = WebSearchTool::new(search, limiter)
            .with_default_max_results(config.search_max_results);

        let invoker = RetryingInvoker::new(RetryPolicy::from_config(config), Arc::clone(&clock));
        let tools = RegistryTools {
            web_search: ToolRef::function(web_search),
            current_date: ToolRef::function(CurrentDateTool::new()),
            delegate_retry: config.retry_delegations.then(|| invoker.clone()),
        };
        let registry = AgentRegistry::build(prompts, tools, config);
        let runner = Arc::new(LlmRunner::new(provider, TierModels::from_config(config)));

        Self::new(runner, invoker, registry, clock, config.max_turns)
    }

    /// The agent registry.
    #[must_use]
    pub const fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    /// Researches `request` and returns the report.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Orchestration`] for an empty or oversized
    /// request, [`AgentError::RetryExhausted`] when the provider stays
    /// overloaded, or the first non-transient provider error.
    pub async fn research(&self, request: &str) -> Result<ResearchReport, AgentError> {
        validate_request(request)?;

        let started = self.clock.now();
        let orchestrator = self.registry.orchestrator();
        info!(
            max_turns = self.max_turns,
            max_retries = self.invoker.policy().max_retries,
            "research started"
        );

        let run = self
            .invoker
            .invoke(self.runner.as_ref(), orchestrator, request, self.max_turns)
            .await?;

        let completed = run.stop != StopReason::TurnLimit;
        let phases = ResearchPhase::trail(&run.exchanges, completed);
        for pair in phases.windows(2) {
            debug!(from = %pair[0], to = %pair[1], "phase transition");
        }

        let outcome = if completed {
            Outcome::Completed
        } else {
            warn!(turns = run.turns_used, "research hit the turn limit, report is best effort");
            Outcome::Degraded
        };

        let elapsed = self.clock.now().saturating_duration_since(started);
        info!(
            turns = run.turns_used,
            exchanges = run.exchanges.len(),
            ?outcome,
            elapsed_secs = elapsed.as_secs_f64(),
            "research finished"
        );

        Ok(ResearchReport {
            text: run.final_output,
            outcome,
            stop: run.stop,
            turns_used: run.turns_used,
            exchanges: run.exchanges,
            phases,
            usage: run.usage,
            elapsed_secs: elapsed.as_secs_f64(),
        })
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("invoker", &self.invoker)
            .field("registry", &self.registry)
            .field("max_turns", &self.max_turns)
            .finish_non_exhaustive()
    }
}

fn validate_request(request: &str) -> Result<(), AgentError> {
    if request.trim().is_empty() {
        return Err(AgentError::Orchestration {
            message: "research request cannot be empty".to_string(),
        });
    }
    if request.len() > MAX_REQUEST_LEN {
        return Err(AgentError::Orchestration {
            message: format!(
                "research request exceeds maximum length ({} bytes, max {MAX_REQUEST_LEN})",
                request.len()
            ),
        });
    }
    Ok(())
}
