//! Agent definitions: instructions, model tier, toolset, delegation rules.

use serde::{Deserialize, Serialize};

use super::tool::{ToolDefinition, ToolRef};

/// Model capability tier. Each tier maps to one configured model name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    /// Cheap, fast model for summarising and writing.
    Light,
    /// General-purpose model.
    Standard,
    /// Strongest model, used for planning.
    Advanced,
}

/// Structural rules the runner enforces on an agent's delegations.
///
/// Only tool calls that delegate to another agent count as exchanges.
/// Native tools (date, search) are never limited by the policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegationPolicy {
    /// Hard ceiling on delegations per run.
    pub max_exchanges: usize,
    /// `(tool, prerequisite)` pairs: `tool` is refused until
    /// `prerequisite` has succeeded at least once in the same run.
    pub prerequisites: Vec<(String, String)>,
    /// Tool whose successful output ends the run and becomes its result.
    pub terminal_tool: Option<String>,
}

impl DelegationPolicy {
    /// Creates a policy with only an exchange ceiling.
    #[must_use]
    pub const fn new(max_exchanges: usize) -> Self {
        Self {
            max_exchanges,
            prerequisites: Vec::new(),
            terminal_tool: None,
        }
    }

    /// Refuses `tool` until `prerequisite` has succeeded.
    #[must_use]
    pub fn require(mut self, tool: impl Into<String>, prerequisite: impl Into<String>) -> Self {
        self.prerequisites.push((tool.into(), prerequisite.into()));
        self
    }

    /// Ends the run as soon as `tool` returns successfully.
    #[must_use]
    pub fn terminal(mut self, tool: impl Into<String>) -> Self {
        self.terminal_tool = Some(tool.into());
        self
    }

    /// Prerequisites declared for `tool`.
    pub fn prerequisites_for<'a>(&'a self, tool: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.prerequisites
            .iter()
            .filter(move |(t, _)| t == tool)
            .map(|(_, required)| required.as_str())
    }

    /// Returns `true` if `tool` is the terminal tool.
    #[must_use]
    pub fn is_terminal(&self, tool: &str) -> bool {
        self.terminal_tool.as_deref() == Some(tool)
    }
}

/// An immutable agent definition.
///
/// Agents hold no per-run state; the same `Arc<AgentSpec>` may be run any
/// number of times, sequentially or concurrently.
#[derive(Debug, Clone)]
pub struct AgentSpec {
    /// Agent name, used in logs and delegated-failure messages.
    pub name: String,
    /// System instructions.
    pub instructions: String,
    /// Model tier the agent runs on.
    pub tier: ModelTier,
    /// Tools offered to the model, in declaration order.
    pub tools: Vec<ToolRef>,
    /// Delegation rules, if any.
    pub policy: Option<DelegationPolicy>,
}

impl AgentSpec {
    /// Creates an agent with no tools and no policy.
    #[must_use]
    pub fn new(name: impl Into<String>, instructions: impl Into<String>, tier: ModelTier) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            tier,
            tools: Vec::new(),
            policy: None,
        }
    }

    /// Appends a tool.
    #[must_use]
    pub fn with_tool(mut self, tool: ToolRef) -> Self {
        self.tools.push(tool);
        self
    }

    /// Attaches a delegation policy.
    #[must_use]
    pub fn with_policy(mut self, policy: DelegationPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Looks up a tool by its exposed name.
    #[must_use]
    pub fn find_tool(&self, name: &str) -> Option<&ToolRef> {
        self.tools.iter().find(|t| t.name() == name)
    }

    /// Definitions of every tool, in declaration order.
    #[must_use]
    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(ToolRef::definition).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::agent::tool::as_tool;

    #[test]
    fn test_policy_prerequisites() {
        let policy = DelegationPolicy::new(7)
            .require("ReportWriterTool", "SynthesisTool")
            .terminal("ReportWriterTool");
        let required: Vec<_> = policy.prerequisites_for("ReportWriterTool").collect();
        assert_eq!(required, vec!["SynthesisTool"]);
        assert_eq!(policy.prerequisites_for("PlanningTool").count(), 0);
        assert!(policy.is_terminal("ReportWriterTool"));
        assert!(!policy.is_terminal("SynthesisTool"));
    }

    #[test]
    fn test_find_tool_by_exposed_name() {
        let planner = Arc::new(AgentSpec::new("PlanningAgent", "plan", ModelTier::Advanced));
        let orchestrator = AgentSpec::new("OrchestratorAgent", "run", ModelTier::Standard)
            .with_tool(as_tool(&planner, "PlanningTool", "Plans research"));

        assert!(orchestrator.find_tool("PlanningTool").is_some());
        assert!(orchestrator.find_tool("PlanningAgent").is_none());
        assert_eq!(orchestrator.tool_definitions().len(), 1);
    }

    #[test]
    fn test_tier_serializes_lowercase() {
        let json = serde_json::to_string(&ModelTier::Advanced).unwrap_or_default();
        assert_eq!(json, "\"advanced\"");
    }
}
