//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::tools::web_search::DEFAULT_MAX_RESULTS;

/// deep-research: multi-agent web research with cited reports.
///
/// An orchestrator delegates planning, searching, reflection, synthesis
/// and report writing to specialised agents.
#[derive(Parser, Debug)]
#[command(name = "deep-research")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logging (overridden by `RUST_LOG`).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Research a request and print the report.
    ///
    /// Needs `GEMINI_API_KEY` (or `RESEARCH_API_KEY`) and `TAVILY_API_KEY`,
    /// from the environment or a `.env` file.
    #[command(after_help = r#"Examples:
  deep-research run "Lead generation systems for business consultancies"
  deep-research run "EU battery regulation" --output report.md
  deep-research run "CRM options" --max-turns 10 --max-retries 3
  deep-research --format json run "query" | jq '.phases'
"#)]
    Run {
        /// The research request.
        request: String,

        /// Save the report text to this file.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Orchestrator turn ceiling.
        #[arg(long)]
        max_turns: Option<usize>,

        /// Attempts before giving up on provider rate limits.
        #[arg(long)]
        max_retries: Option<u32>,

        /// Model for the light tier (reflection, synthesis, report).
        #[arg(long)]
        light_model: Option<String>,

        /// Model for the standard tier (orchestrator, web search).
        #[arg(long)]
        standard_model: Option<String>,

        /// Model for the advanced tier (planning).
        #[arg(long)]
        advanced_model: Option<String>,

        /// Directory with prompt template overrides.
        #[arg(long)]
        prompt_dir: Option<PathBuf>,
    },

    /// Run a single rate-limited web search.
    #[command(after_help = r#"Examples:
  deep-research search "lead generation consultancy"
  deep-research search "b2b outbound benchmarks" -k 10
"#)]
    Search {
        /// Search query text.
        query: String,

        /// Maximum number of results.
        #[arg(short = 'k', long, default_value_t = DEFAULT_MAX_RESULTS)]
        max_results: u32,
    },

    /// Write the default prompt templates for customisation.
    ///
    /// Existing files are left untouched.
    InitPrompts {
        /// Target directory (defaults to `~/.config/deep-research/prompts`).
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_with_overrides() {
        let cli = Cli::try_parse_from([
            "deep-research",
            "--format",
            "json",
            "run",
            "lead generation",
            "--output",
            "report.md",
            "--max-turns",
            "8",
        ])
        .unwrap_or_else(|e| unreachable!("{e}"));

        assert_eq!(cli.format, "json");
        match cli.command {
            Commands::Run {
                request,
                output,
                max_turns,
                max_retries,
                ..
            } => {
                assert_eq!(request, "lead generation");
                assert_eq!(output, Some(PathBuf::from("report.md")));
                assert_eq!(max_turns, Some(8));
                assert_eq!(max_retries, None);
            }
            other => unreachable!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_search_default_max_results() {
        let cli = Cli::try_parse_from(["deep-research", "search", "rust"])
            .unwrap_or_else(|e| unreachable!("{e}"));
        assert!(matches!(
            cli.command,
            Commands::Search { max_results: 5, .. }
        ));
    }

    #[test]
    fn test_run_requires_request() {
        assert!(Cli::try_parse_from(["deep-research", "run"]).is_err());
    }
}
