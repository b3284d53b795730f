//! The fixed research topology: five sub-agents behind one orchestrator.

use std::sync::Arc;

use super::config::ResearchConfig;
use super::prompt::PromptSet;
use super::retry::RetryingInvoker;
use super::spec::{AgentSpec, DelegationPolicy, ModelTier};
use super::tool::{AgentTool, ToolRef};

/// Name of the orchestrating agent.
pub const ORCHESTRATOR_NAME: &str = "OrchestratorAgent";

/// A sub-agent role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResearchRole {
    /// Produces the research plan.
    Planner,
    /// Runs web searches and cites results.
    WebSearcher,
    /// Judges whether the findings are sufficient.
    Reflector,
    /// Merges findings into a knowledge base.
    Synthesizer,
    /// Writes the final report.
    ReportWriter,
}

impl ResearchRole {
    /// Every role, in the order the orchestrator usually uses them.
    pub const ALL: [Self; 5] = [
        Self::Planner,
        Self::WebSearcher,
        Self::Reflector,
        Self::Synthesizer,
        Self::ReportWriter,
    ];

    /// Agent name.
    #[must_use]
    pub const fn agent_name(self) -> &'static str {
        match self {
            Self::Planner => "PlanningAgent",
            Self::WebSearcher => "WebSearchAgent",
            Self::Reflector => "ReflectionAgent",
            Self::Synthesizer => "SynthesisAgent",
            Self::ReportWriter => "ReportWriterAgent",
        }
    }

    /// Name under which the orchestrator sees the agent as a tool.
    #[must_use]
    pub const fn tool_name(self) -> &'static str {
        match self {
            Self::Planner => "PlanningTool",
            Self::WebSearcher => "WebSearchTool",
            Self::Reflector => "ReflectionTool",
            Self::Synthesizer => "SynthesisTool",
            Self::ReportWriter => "ReportWriterTool",
        }
    }

    /// Tool description shown to the orchestrator's model.
    #[must_use]
    pub const fn tool_description(self) -> &'static str {
        match self {
            Self::Planner => "Planning assistant with scientific reasoning",
            Self::WebSearcher => "Real web search assistant with citations",
            Self::Reflector => "Reflection assistant",
            Self::Synthesizer => "Merges and organizes research findings",
            Self::ReportWriter => "Creates the final polished research report with citations",
        }
    }

    /// Model tier.
    #[must_use]
    pub const fn tier(self) -> ModelTier {
        match self {
            Self::Planner => ModelTier::Advanced,
            Self::WebSearcher => ModelTier::Standard,
            Self::Reflector | Self::Synthesizer | Self::ReportWriter => ModelTier::Light,
        }
    }

    /// Role exposed under `tool_name`, if any.
    #[must_use]
    pub fn from_tool_name(tool_name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.tool_name() == tool_name)
    }

    fn instructions(self, prompts: &PromptSet) -> &str {
        match self {
            Self::Planner => &prompts.planner,
            Self::WebSearcher => &prompts.web_searcher,
            Self::Reflector => &prompts.reflector,
            Self::Synthesizer => &prompts.synthesizer,
            Self::ReportWriter => &prompts.report_writer,
        }
    }
}

/// Native tools and delegation settings the registry wires in.
#[derive(Debug, Clone)]
pub struct RegistryTools {
    /// The rate-limited search tool, given to the web searcher.
    pub web_search: ToolRef,
    /// The date tool, given to the orchestrator.
    pub current_date: ToolRef,
    /// Retry wrapper for delegated runs, if enabled.
    pub delegate_retry: Option<RetryingInvoker>,
}

/// Every agent of the topology, built once and shared.
#[derive(Debug, Clone)]
pub struct AgentRegistry {
    agents: Vec<(ResearchRole, Arc<AgentSpec>)>,
    orchestrator: Arc<AgentSpec>,
}

impl AgentRegistry {
    /// Builds the sub-agents and the orchestrator that delegates to them.
    ///
    /// The orchestrator carries the delegation policy: at most
    /// `config.max_exchanges` delegations, the report writer only after a
    /// successful synthesis, and the report writer's output ends the run.
    #[must_use]
    pub fn build(prompts: &PromptSet, tools: RegistryTools, config: &ResearchConfig) -> Self {
        let agents: Vec<_> = ResearchRole::ALL
            .into_iter()
            .map(|role| {
                let mut spec =
                    AgentSpec::new(role.agent_name(), role.instructions(prompts), role.tier());
                if role == ResearchRole::WebSearcher {
                    spec = spec.with_tool(tools.web_search.clone());
                }
                (role, Arc::new(spec))
            })
            .collect();

        let policy = DelegationPolicy::new(config.max_exchanges)
            .require(
                ResearchRole::ReportWriter.tool_name(),
                ResearchRole::Synthesizer.tool_name(),
            )
            .terminal(ResearchRole::ReportWriter.tool_name());

        let mut orchestrator = AgentSpec::new(
            ORCHESTRATOR_NAME,
            prompts.orchestrator_for(config.max_exchanges),
            ModelTier::Standard,
        )
        .with_tool(tools.current_date)
        .with_policy(policy);

        for role in [
            ResearchRole::Planner,
            ResearchRole::Reflector,
            ResearchRole::WebSearcher,
            ResearchRole::ReportWriter,
            ResearchRole::Synthesizer,
        ] {
            let Some((_, spec)) = agents.iter().find(|(r, _)| *r == role) else {
                continue;
            };
            let mut tool = AgentTool::new(Arc::clone(spec), role.tool_name(), role.tool_description())
                .with_max_turns(config.delegate_max_turns);
            if let Some(invoker) = &tools.delegate_retry {
                tool = tool.with_retry(invoker.clone());
            }
            orchestrator = orchestrator.with_tool(tool.into());
        }

        Self {
            agents,
            orchestrator: Arc::new(orchestrator),
        }
    }

    /// The sub-agent playing `role`.
    #[must_use]
    pub fn get(&self, role: ResearchRole) -> Option<&Arc<AgentSpec>> {
        self.agents.iter().find(|(r, _)| *r == role).map(|(_, a)| a)
    }

    /// The orchestrator.
    #[must_use]
    pub const fn orchestrator(&self) -> &Arc<AgentSpec> {
        &self.orchestrator
    }
}
