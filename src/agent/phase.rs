//! Research phases, reconstructed from the orchestrator's delegations.

use std::fmt;

use serde::Serialize;

use super::roles::ResearchRole;
use super::runner::Exchange;

/// Where a research run is in its workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResearchPhase {
    /// Request received.
    Started,
    /// Plan being drawn up.
    Planning,
    /// Searching the web.
    Researching,
    /// Checking sufficiency.
    Reflecting,
    /// Merging findings.
    Synthesizing,
    /// Writing the report.
    Reporting,
    /// Report delivered.
    Done,
}

impl ResearchPhase {
    /// Phase entered by a successful delegation to `role`.
    #[must_use]
    pub const fn entered_by(role: ResearchRole) -> Self {
        match role {
            ResearchRole::Planner => Self::Planning,
            ResearchRole::WebSearcher => Self::Researching,
            ResearchRole::Reflector => Self::Reflecting,
            ResearchRole::Synthesizer => Self::Synthesizing,
            ResearchRole::ReportWriter => Self::Reporting,
        }
    }

    /// Replays `exchanges` into the sequence of phases visited.
    ///
    /// Failed delegations do not move the phase; repeated delegations to
    /// the same role collapse into one step. `Done` is appended when the
    /// run `completed`.
    #[must_use]
    pub fn trail(exchanges: &[Exchange], completed: bool) -> Vec<Self> {
        let mut trail = vec![Self::Started];

        let visited = exchanges
            .iter()
            .filter(|e| !e.is_error)
            .filter_map(|e| ResearchRole::from_tool_name(&e.tool))
            .map(Self::entered_by);

        for phase in visited {
            if trail.last() != Some(&phase) {
                trail.push(phase);
            }
        }

        if completed {
            trail.push(Self::Done);
        }
        trail
    }
}

impl fmt::Display for ResearchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Started => "started",
            Self::Planning => "planning",
            Self::Researching => "researching",
            Self::Reflecting => "reflecting",
            Self::Synthesizing => "synthesizing",
            Self::Reporting => "reporting",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ex(tool: &str, is_error: bool) -> Exchange {
        Exchange {
            tool: tool.to_string(),
            is_error,
        }
    }

    #[test]
    fn test_full_workflow_trail() {
        let exchanges = [
            ex("PlanningTool", false),
            ex("WebSearchTool", false),
            ex("WebSearchTool", false),
            ex("ReflectionTool", false),
            ex("WebSearchTool", false),
            ex("ReflectionTool", false),
            ex("SynthesisTool", false),
            ex("ReportWriterTool", false),
        ];
        assert_eq!(
            ResearchPhase::trail(&exchanges, true),
            vec![
                ResearchPhase::Started,
                ResearchPhase::Planning,
                ResearchPhase::Researching,
                ResearchPhase::Reflecting,
                ResearchPhase::Researching,
                ResearchPhase::Reflecting,
                ResearchPhase::Synthesizing,
                ResearchPhase::Reporting,
                ResearchPhase::Done,
            ]
        );
    }

    #[test]
    fn test_failed_delegations_ignored() {
        let exchanges = [ex("PlanningTool", true), ex("WebSearchTool", false)];
        assert_eq!(
            ResearchPhase::trail(&exchanges, false),
            vec![ResearchPhase::Started, ResearchPhase::Researching]
        );
    }

    #[test]
    fn test_empty_trail() {
        assert_eq!(
            ResearchPhase::trail(&[], true),
            vec![ResearchPhase::Started, ResearchPhase::Done]
        );
        assert_eq!(ResearchPhase::Synthesizing.to_string(), "synthesizing");
    }
}
