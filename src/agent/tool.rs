//! Tool types for function-calling.
//!
//! A [`ToolRef`] is either a native function ([`NativeTool`]) or another
//! agent exposed through [`as_tool`]. Both are invoked the same way: JSON
//! arguments in, [`ToolOutput`] out. A tool that ran but has bad news to
//! report returns [`ToolOutput::Failure`]; an invocation that could not run
//! at all is an `Err`.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::retry::RetryingInvoker;
use super::runner::AgentRunner;
use super::spec::AgentSpec;
use crate::error::AgentError;

/// Turn budget for a delegated agent run unless configured otherwise.
pub const DEFAULT_DELEGATE_TURNS: usize = 10;

/// A tool definition that can be sent to an LLM for function-calling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name, unique within an agent's toolset.
    pub name: String,
    /// Human-readable description of what the tool does.
    pub description: String,
    /// JSON Schema object describing the tool's parameters.
    pub parameters: serde_json::Value,
}

/// A tool call requested by the LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this call (assigned by the provider).
    pub id: String,
    /// Name of the tool to invoke.
    pub name: String,
    /// JSON-encoded arguments for the tool.
    pub arguments: String,
}

/// The result of executing a tool call, as fed back to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// ID of the tool call this result corresponds to.
    pub tool_call_id: String,
    /// Result content.
    pub content: String,
    /// Whether this result represents an error.
    pub is_error: bool,
}

/// Text produced by a tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutput {
    /// Normal result.
    Text(String),
    /// The tool ran but failed; the text describes the failure for the model.
    Failure(String),
}

impl ToolOutput {
    /// The text regardless of outcome.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Text(t) | Self::Failure(t) => t,
        }
    }

    /// Consumes the output, returning its text.
    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Self::Text(t) | Self::Failure(t) => t,
        }
    }

    /// Returns `true` for [`ToolOutput::Failure`].
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }
}

/// A natively implemented tool.
#[async_trait]
pub trait NativeTool: Send + Sync {
    /// Exposed tool name.
    fn name(&self) -> &str;

    /// Schema sent to the model.
    fn definition(&self) -> ToolDefinition;

    /// Runs the tool with JSON-encoded `arguments`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ToolExecution`] if the arguments cannot be
    /// decoded.
    async fn call(&self, arguments: &str) -> Result<ToolOutput, AgentError>;
}

/// An agent exposed as a tool.
#[derive(Clone)]
pub struct AgentTool {
    agent: Arc<AgentSpec>,
    name: String,
    description: String,
    max_turns: usize,
    retry: Option<RetryingInvoker>,
}

#[derive(Deserialize)]
struct AgentToolArgs {
    input: String,
}

impl AgentTool {
    /// Wraps `agent` under an exposed name and description.
    #[must_use]
    pub fn new(
        agent: Arc<AgentSpec>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            agent,
            name: name.into(),
            description: description.into(),
            max_turns: DEFAULT_DELEGATE_TURNS,
            retry: None,
        }
    }

    /// Sets the turn budget of each delegated run.
    #[must_use]
    pub const fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns;
        self
    }

    /// Runs delegations through `invoker` instead of calling the runner
    /// directly.
    #[must_use]
    pub fn with_retry(mut self, invoker: RetryingInvoker) -> Self {
        self.retry = Some(invoker);
        self
    }

    /// The wrapped agent.
    #[must_use]
    pub fn agent(&self) -> &AgentSpec {
        &self.agent
    }

    /// Turn budget of each delegated run.
    #[must_use]
    pub const fn max_turns(&self) -> usize {
        self.max_turns
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.clone(),
            description: self.description.clone(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "input": {
                        "type": "string",
                        "description": "Instruction for the agent, including any findings it needs."
                    }
                },
                "required": ["input"],
                "additionalProperties": false
            }),
        }
    }

    /// Extracts the instruction from `{"input": ...}`, a bare JSON string,
    /// or raw text.
    fn instruction(&self, arguments: &str) -> Result<String, AgentError> {
        let instruction = serde_json::from_str::<AgentToolArgs>(arguments)
            .map(|args| args.input)
            .or_else(|_| serde_json::from_str::<String>(arguments))
            .unwrap_or_else(|_| arguments.trim().to_string());

        if instruction.trim().is_empty() {
            return Err(AgentError::ToolExecution {
                name: self.name.clone(),
                message: "missing instruction".to_string(),
            });
        }
        Ok(instruction)
    }

    async fn invoke(
        &self,
        arguments: &str,
        runner: &dyn AgentRunner,
    ) -> Result<ToolOutput, AgentError> {
        let instruction = self.instruction(arguments)?;

        let result = match &self.retry {
            Some(invoker) => {
                invoker
                    .invoke(runner, &self.agent, &instruction, self.max_turns)
                    .await
            }
            None => runner.run(&self.agent, &instruction, self.max_turns).await,
        };

        match result {
            Ok(run) => Ok(ToolOutput::Text(run.final_output)),
            Err(e) if e.is_transient() => Err(e),
            Err(e) => Err(AgentError::ToolExecution {
                name: self.agent.name.clone(),
                message: e.to_string(),
            }),
        }
    }
}

impl fmt::Debug for AgentTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentTool")
            .field("name", &self.name)
            .field("agent", &self.agent.name)
            .field("max_turns", &self.max_turns)
            .field("retry", &self.retry.is_some())
            .finish()
    }
}

/// A tool an agent may call.
#[derive(Clone)]
pub enum ToolRef {
    /// Native function.
    Function(Arc<dyn NativeTool>),
    /// Delegation to another agent.
    Agent(AgentTool),
}

impl ToolRef {
    /// Wraps a native tool.
    #[must_use]
    pub fn function(tool: impl NativeTool + 'static) -> Self {
        Self::Function(Arc::new(tool))
    }

    /// Exposed tool name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Function(tool) => tool.name(),
            Self::Agent(tool) => &tool.name,
        }
    }

    /// Schema sent to the model.
    #[must_use]
    pub fn definition(&self) -> ToolDefinition {
        match self {
            Self::Function(tool) => tool.definition(),
            Self::Agent(tool) => tool.definition(),
        }
    }

    /// Returns `true` if calling this tool delegates to another agent.
    #[must_use]
    pub const fn is_delegation(&self) -> bool {
        matches!(self, Self::Agent(_))
    }

    /// Invokes the tool. Delegations run the wrapped agent on `runner`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ToolExecution`] for malformed arguments or a
    /// failed delegation, and passes transient provider errors through
    /// unchanged.
    pub async fn invoke(
        &self,
        arguments: &str,
        runner: &dyn AgentRunner,
    ) -> Result<ToolOutput, AgentError> {
        match self {
            Self::Function(tool) => tool.call(arguments).await,
            Self::Agent(tool) => tool.invoke(arguments, runner).await,
        }
    }
}

impl From<AgentTool> for ToolRef {
    fn from(tool: AgentTool) -> Self {
        Self::Agent(tool)
    }
}

impl fmt::Debug for ToolRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Function(tool) => f.debug_tuple("Function").field(&tool.name()).finish(),
            Self::Agent(tool) => f.debug_tuple("Agent").field(tool).finish(),
        }
    }
}

/// Exposes `agent` as a tool named `name`.
///
/// The tool takes one instruction, runs the agent with its own turn budget
/// and returns the agent's final text.
#[must_use]
pub fn as_tool(agent: &Arc<AgentSpec>, name: &str, description: &str) -> ToolRef {
    ToolRef::Agent(AgentTool::new(Arc::clone(agent), name, description))
}
