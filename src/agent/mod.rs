//! Multi-agent research orchestration.
//!
//! A fixed topology of five sub-agents, each exposed to an orchestrating
//! agent as a tool. Every model call goes through the pluggable
//! [`LlmProvider`] abstraction, backed by `OpenAI`-compatible APIs.
//!
//! # Architecture
//!
//! ```text
//! Research request → Orchestrator (through RetryingInvoker)
//!   └── OrchestratorAgent, bounded by turns and exchanges
//!       ├── current_date
//!       ├── PlanningTool      → PlanningAgent
//!       ├── WebSearchTool     → WebSearchAgent → web_search (rate-limited)
//!       ├── ReflectionTool    → ReflectionAgent
//!       ├── SynthesisTool     → SynthesisAgent
//!       └── ReportWriterTool  → ReportWriterAgent (ends the run)
//! ```

pub mod agentic_loop;
pub mod client;
pub mod config;
pub mod message;
pub mod orchestrator;
pub mod phase;
pub mod prompt;
pub mod provider;
pub mod providers;
pub mod retry;
pub mod roles;
pub mod runner;
pub mod spec;
pub mod tool;

pub use config::ResearchConfig;
pub use message::{ChatMessage, ChatRequest, ChatResponse, Role, TokenUsage};
pub use orchestrator::{Orchestrator, Outcome, ResearchReport};
pub use phase::ResearchPhase;
pub use prompt::PromptSet;
pub use provider::LlmProvider;
pub use retry::{RetryPolicy, RetryingInvoker};
pub use roles::{AgentRegistry, ResearchRole};
pub use runner::{AgentRunner, Exchange, LlmRunner, RunResult, StopReason};
pub use spec::{AgentSpec, DelegationPolicy, ModelTier};
pub use tool::{AgentTool, NativeTool, ToolCall, ToolDefinition, ToolOutput, ToolRef, as_tool};
