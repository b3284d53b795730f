//! Agentic tool-calling loop.
//!
//! Drives the LLM ↔ tool round-trip for one agent run: sends the
//! conversation to the model, executes any tool calls in the response,
//! appends the results and repeats until the model answers without tools,
//! the agent's terminal tool returns, or the turn budget is spent.
//!
//! Running out of turns is not an error: the run ends with the best text
//! seen so far.

use tracing::{debug, warn};

use super::message::{
    ChatRequest, TokenUsage, assistant_tool_calls_message, system_message, tool_message,
    user_message,
};
use super::provider::LlmProvider;
use super::runner::{AgentRunner, Exchange, RunResult, StopReason};
use super::spec::{AgentSpec, DelegationPolicy};
use super::tool::{ToolCall, ToolRef, ToolResult};
use crate::error::AgentError;

/// Output of a turn-limited run that produced no text at all.
pub const NO_OUTPUT_PLACEHOLDER: &str =
    "The research stopped at its turn limit before any findings were produced.";

/// Output of a run whose agent finished without producing any text.
pub const EMPTY_ANSWER_PLACEHOLDER: &str = "The agent finished without producing any output.";

/// Tracks delegations within one run and applies the agent's policy.
struct DelegationGuard<'a> {
    policy: Option<&'a DelegationPolicy>,
    exchanges: Vec<Exchange>,
}

impl<'a> DelegationGuard<'a> {
    const fn new(policy: Option<&'a DelegationPolicy>) -> Self {
        Self {
            policy,
            exchanges: Vec::new(),
        }
    }

    /// Returns the refusal message if `tool` may not be called now.
    fn check(&self, tool: &ToolRef) -> Option<String> {
        let policy = self.policy?;
        if !tool.is_delegation() {
            return None;
        }

        if self.exchanges.len() >= policy.max_exchanges {
            return Some(format!(
                "Delegation refused: the limit of {} agent exchanges has been reached. \
                 Summarize the best answer you can from the findings so far and stop.",
                policy.max_exchanges
            ));
        }

        policy
            .prerequisites_for(tool.name())
            .find(|required| !self.succeeded(required))
            .map(|required| {
                format!(
                    "Delegation refused: {} requires a successful {required} call first.",
                    tool.name()
                )
            })
    }

    fn succeeded(&self, tool: &str) -> bool {
        self.exchanges.iter().any(|e| e.tool == tool && !e.is_error)
    }

    fn record(&mut self, tool: &str, is_error: bool) {
        self.exchanges.push(Exchange {
            tool: tool.to_string(),
            is_error,
        });
    }

    fn is_terminal(&self, tool: &str) -> bool {
        self.policy.is_some_and(|p| p.is_terminal(tool))
    }
}

/// Runs `agent` on `prompt` against `provider` for at most `max_turns`
/// model calls. Delegated agents are run on `runner`.
///
/// Tool failures are fed back to the model as error results; only model
/// errors and transient failures from delegated agents end the run early.
///
/// # Errors
///
/// Propagates provider errors and transient delegation errors.
pub async fn run_agent(
    provider: &dyn LlmProvider,
    runner: &dyn AgentRunner,
    model: &str,
    agent: &AgentSpec,
    prompt: &str,
    max_turns: usize,
) -> Result<RunResult, AgentError> {
    let mut request = ChatRequest {
        model: model.to_string(),
        messages: vec![system_message(&agent.instructions), user_message(prompt)],
        temperature: None,
        tools: agent.tool_definitions(),
    };
    let mut guard = DelegationGuard::new(agent.policy.as_ref());
    let mut usage = TokenUsage::default();
    let mut last_text: Option<String> = None;
    let mut last_tool_output: Option<String> = None;

    for turn in 1..=max_turns {
        let response = provider.chat(&request).await?;
        usage.accumulate(response.usage);

        if !response.content.trim().is_empty() {
            last_text = Some(response.content.clone());
        }

        if response.tool_calls.is_empty() {
            debug!(agent = %agent.name, turn, "agent produced final answer");
            let final_output = if response.content.trim().is_empty() {
                best_effort(last_text, last_tool_output, EMPTY_ANSWER_PLACEHOLDER)
            } else {
                response.content
            };
            return Ok(RunResult {
                final_output,
                turns_used: turn,
                stop: StopReason::Completed,
                exchanges: guard.exchanges,
                usage,
            });
        }

        debug!(
            agent = %agent.name,
            turn,
            tool_count = response.tool_calls.len(),
            "executing tool calls"
        );

        request.messages.push(assistant_tool_calls_message(
            response.content,
            response.tool_calls.clone(),
        ));

        for call in &response.tool_calls {
            let result = execute(agent, runner, &mut guard, call).await?;
            debug!(
                tool = %call.name,
                call_id = %call.id,
                is_error = result.is_error,
                "tool execution complete"
            );

            if !result.is_error {
                if guard.is_terminal(&call.name) {
                    debug!(agent = %agent.name, turn, tool = %call.name, "terminal tool returned");
                    return Ok(RunResult {
                        final_output: result.content,
                        turns_used: turn,
                        stop: StopReason::TerminalTool,
                        exchanges: guard.exchanges,
                        usage,
                    });
                }
                if !result.content.trim().is_empty() {
                    last_tool_output = Some(result.content.clone());
                }
            }

            request
                .messages
                .push(tool_message(&result.tool_call_id, &result.content));
        }
    }

    warn!(agent = %agent.name, max_turns, "turn limit reached, returning best-effort output");
    Ok(RunResult {
        final_output: best_effort(last_text, last_tool_output, NO_OUTPUT_PLACEHOLDER),
        turns_used: max_turns,
        stop: StopReason::TurnLimit,
        exchanges: guard.exchanges,
        usage,
    })
}

/// Executes one tool call, converting broken invocations into error results.
async fn execute(
    agent: &AgentSpec,
    runner: &dyn AgentRunner,
    guard: &mut DelegationGuard<'_>,
    call: &ToolCall,
) -> Result<ToolResult, AgentError> {
    let error_result = |content: String| ToolResult {
        tool_call_id: call.id.clone(),
        content,
        is_error: true,
    };

    let Some(tool) = agent.find_tool(&call.name) else {
        warn!(agent = %agent.name, tool = %call.name, "model called an unknown tool");
        return Ok(error_result(format!("Unknown tool: {}", call.name)));
    };

    if let Some(refusal) = guard.check(tool) {
        warn!(agent = %agent.name, tool = %call.name, "delegation refused");
        return Ok(error_result(refusal));
    }

    match tool.invoke(&call.arguments, runner).await {
        Ok(output) => {
            if tool.is_delegation() {
                guard.record(tool.name(), false);
            }
            Ok(ToolResult {
                tool_call_id: call.id.clone(),
                is_error: output.is_failure(),
                content: output.into_text(),
            })
        }
        Err(e @ AgentError::ToolExecution { .. }) => {
            if tool.is_delegation() {
                guard.record(tool.name(), true);
            }
            Ok(error_result(format!("Error: {e}")))
        }
        Err(e) => Err(e),
    }
}

fn best_effort(
    last_text: Option<String>,
    last_tool_output: Option<String>,
    placeholder: &str,
) -> String {
    last_text
        .or(last_tool_output)
        .unwrap_or_else(|| placeholder.to_string())
}
