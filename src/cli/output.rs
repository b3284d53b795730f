//! Output formatting for CLI commands.

use std::fmt::Write as _;
use std::path::Path;

use serde::Serialize;

use crate::agent::orchestrator::{Outcome, ResearchReport};

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl OutputFormat {
    /// Parses a format name, defaulting to text.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Text
        }
    }

    /// Serializes `value` as pretty JSON.
    #[must_use]
    pub fn to_json<T: Serialize + ?Sized>(self, value: &T) -> String {
        serde_json::to_string_pretty(value)
            .unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() }).to_string())
    }
}

/// Renders a report for the terminal: the text, then a one-line summary.
#[must_use]
pub fn format_report(report: &ResearchReport, saved_to: Option<&Path>) -> String {
    let mut out = report.text.trim_end().to_string();
    let outcome = match report.outcome {
        Outcome::Completed => "completed",
        Outcome::Degraded => "degraded (turn limit reached)",
    };
    let _ = write!(
        out,
        "\n\n---\nOutcome: {outcome} | Turns: {} | Exchanges: {} | Tokens: {} | Time: {:.1}s",
        report.turns_used,
        report.exchanges.len(),
        report.usage.total_tokens,
        report.elapsed_secs,
    );
    if let Some(path) = saved_to {
        let _ = write!(out, "\nReport saved to: {}", path.display());
    }
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::message::TokenUsage;
    use crate::agent::phase::ResearchPhase;
    use crate::agent::runner::StopReason;

    fn report(outcome: Outcome) -> ResearchReport {
        ResearchReport {
            text: "# Report\n\nBody.\n".to_string(),
            outcome,
            stop: StopReason::TerminalTool,
            turns_used: 6,
            exchanges: Vec::new(),
            phases: vec![ResearchPhase::Started, ResearchPhase::Done],
            usage: TokenUsage::default(),
            elapsed_secs: 12.34,
        }
    }

    #[test]
    fn test_parse_format() {
        assert_eq!(OutputFormat::parse("json"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("JSON"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("yaml"), OutputFormat::Text);
    }

    #[test]
    fn test_format_report_text() {
        let out = format_report(&report(Outcome::Completed), Some(Path::new("out.md")));
        assert!(out.starts_with("# Report\n\nBody.\n\n---\n"));
        assert!(out.contains("Outcome: completed | Turns: 6"));
        assert!(out.contains("Time: 12.3s"));
        assert!(out.contains("Report saved to: out.md"));
    }

    #[test]
    fn test_format_report_degraded() {
        let out = format_report(&report(Outcome::Degraded), None);
        assert!(out.contains("degraded"));
        assert!(!out.contains("saved"));
    }

    #[test]
    fn test_report_json_shape() {
        let json = OutputFormat::Json.to_json(&report(Outcome::Completed));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap_or_default();
        assert_eq!(value["outcome"], "completed");
        assert_eq!(value["stop"], "terminal_tool");
        assert_eq!(value["phases"][1], "done");
    }
}
