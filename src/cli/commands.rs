//! CLI command implementations.
//!
//! Each command builds what it needs from configuration and bridges into
//! async code with its own tokio runtime.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::agent::client::create_provider;
use crate::agent::config::ResearchConfig;
use crate::agent::orchestrator::Orchestrator;
use crate::agent::prompt::PromptSet;
use crate::cli::output::{OutputFormat, format_report};
use crate::cli::parser::{Cli, Commands};
use crate::clock::{Clock, SystemClock};
use crate::error::{CommandError, Result};
use crate::search::{RateLimiter, create_search_provider};
use crate::tools::WebSearchTool;

/// Parameters for the run command.
#[derive(Debug, Clone, Default)]
pub struct RunParams<'a> {
    /// The research request.
    pub request: &'a str,
    /// Where to save the report text.
    pub output: Option<&'a Path>,
    /// Orchestrator turn ceiling override.
    pub max_turns: Option<usize>,
    /// Retry budget override.
    pub max_retries: Option<u32>,
    /// Light-tier model override.
    pub light_model: Option<&'a str>,
    /// Standard-tier model override.
    pub standard_model: Option<&'a str>,
    /// Advanced-tier model override.
    pub advanced_model: Option<&'a str>,
    /// Prompt template directory.
    pub prompt_dir: Option<&'a Path>,
}

/// Executes the parsed CLI command and returns its output.
///
/// # Errors
///
/// Returns an error if the command fails.
pub fn execute(cli: &Cli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);

    match &cli.command {
        Commands::Run {
            request,
            output,
            max_turns,
            max_retries,
            light_model,
            standard_model,
            advanced_model,
            prompt_dir,
        } => {
            let params = RunParams {
                request,
                output: output.as_deref(),
                max_turns: *max_turns,
                max_retries: *max_retries,
                light_model: light_model.as_deref(),
                standard_model: standard_model.as_deref(),
                advanced_model: advanced_model.as_deref(),
                prompt_dir: prompt_dir.as_deref(),
            };
            cmd_run(&params, format)
        }
        Commands::Search { query, max_results } => cmd_search(query, *max_results, format),
        Commands::InitPrompts { dir } => cmd_init_prompts(dir.as_deref(), format),
    }
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().map_err(|e| {
        CommandError::ExecutionFailed(format!("Failed to create async runtime: {e}")).into()
    })
}

fn build_config(params: &RunParams<'_>) -> Result<ResearchConfig> {
    let mut builder = ResearchConfig::builder();
    if let Some(n) = params.max_turns {
        builder = builder.max_turns(n);
    }
    if let Some(n) = params.max_retries {
        builder = builder.max_retries(n);
    }
    if let Some(model) = params.light_model {
        builder = builder.light_model(model);
    }
    if let Some(model) = params.standard_model {
        builder = builder.standard_model(model);
    }
    if let Some(model) = params.advanced_model {
        builder = builder.advanced_model(model);
    }
    if let Some(dir) = params.prompt_dir {
        builder = builder.prompt_dir(dir);
    }

    builder.from_env().build().map_err(|e| {
        CommandError::ExecutionFailed(format!("Configuration error: {e}")).into()
    })
}

fn cmd_run(params: &RunParams<'_>, format: OutputFormat) -> Result<String> {
    let config = build_config(params)?;

    let provider = create_provider(&config).map_err(|e| {
        CommandError::ExecutionFailed(format!("Provider creation failed: {e}"))
    })?;
    let search = create_search_provider(&config).map_err(|e| {
        CommandError::ExecutionFailed(format!("Search provider creation failed: {e}"))
    })?;
    let prompts = PromptSet::load(config.prompt_dir.as_deref());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let limiter = Arc::new(RateLimiter::new(config.search_interval, Arc::clone(&clock)));

    let orchestrator = Orchestrator::from_config(
        &config,
        Arc::from(provider),
        Arc::from(search),
        limiter,
        &prompts,
        clock,
    );

    let report = runtime()?
        .block_on(orchestrator.research(params.request))
        .map_err(|e| CommandError::ExecutionFailed(format!("Research failed: {e}")))?;

    if let Some(path) = params.output {
        std::fs::write(path, &report.text).map_err(CommandError::from)?;
    }

    match format {
        OutputFormat::Text => Ok(format_report(&report, params.output)),
        OutputFormat::Json => {
            let mut value = serde_json::to_value(&report).map_err(|e| {
                CommandError::OutputFormat(format!("JSON serialization failed: {e}"))
            })?;
            if let (Some(path), Some(obj)) = (params.output, value.as_object_mut()) {
                obj.insert(
                    "saved_to".to_string(),
                    serde_json::Value::String(path.display().to_string()),
                );
            }
            Ok(format.to_json(&value))
        }
    }
}

fn cmd_search(query: &str, max_results: u32, format: OutputFormat) -> Result<String> {
    let config = ResearchConfig::builder().from_env().build_for_search();
    let provider = create_search_provider(&config)?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let limiter = Arc::new(RateLimiter::new(config.search_interval, clock));
    let tool = WebSearchTool::new(Arc::from(provider), limiter)
        .with_default_max_results(config.search_max_results);

    let output = runtime()?.block_on(tool.search(query, max_results));

    match format {
        OutputFormat::Text => Ok(format!("{}\n", output.text())),
        OutputFormat::Json => Ok(format.to_json(&serde_json::json!({
            "query": query,
            "max_results": max_results,
            "failed": output.is_failure(),
            "results": output.text(),
        }))),
    }
}

fn cmd_init_prompts(dir: Option<&Path>, format: OutputFormat) -> Result<String> {
    let target_dir = dir
        .map(PathBuf::from)
        .or_else(PromptSet::default_dir)
        .ok_or_else(|| {
            CommandError::ExecutionFailed(
                "Could not determine home directory for default prompt path".to_string(),
            )
        })?;

    let written = PromptSet::write_defaults(&target_dir).map_err(|e| {
        CommandError::ExecutionFailed(format!("Failed to write prompt templates: {e}"))
    })?;

    match format {
        OutputFormat::Text if written.is_empty() => Ok(format!(
            "All prompt templates already exist in: {}\n",
            target_dir.display()
        )),
        OutputFormat::Text => {
            let mut output = format!(
                "Wrote {} prompt template(s) to: {}\n",
                written.len(),
                target_dir.display()
            );
            for path in &written {
                let name = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("unknown");
                output.push_str("  ");
                output.push_str(name);
                output.push('\n');
            }
            output.push_str("\nEdit these files to customize agent instructions.\n");
            Ok(output)
        }
        OutputFormat::Json => Ok(format.to_json(&serde_json::json!({
            "directory": target_dir.to_string_lossy(),
            "written": written
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect::<Vec<_>>(),
            "count": written.len(),
        }))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_prompts_text_then_noop() {
        let dir = tempfile::tempdir().unwrap_or_else(|_| unreachable!());

        let first = cmd_init_prompts(Some(dir.path()), OutputFormat::Text)
            .unwrap_or_else(|e| unreachable!("{e}"));
        assert!(first.starts_with("Wrote 6 prompt template(s)"));
        assert!(first.contains("orchestrator.md"));

        let second = cmd_init_prompts(Some(dir.path()), OutputFormat::Text)
            .unwrap_or_else(|e| unreachable!("{e}"));
        assert!(second.starts_with("All prompt templates already exist"));
    }

    #[test]
    fn test_init_prompts_json() {
        let dir = tempfile::tempdir().unwrap_or_else(|_| unreachable!());

        let out = cmd_init_prompts(Some(dir.path()), OutputFormat::Json)
            .unwrap_or_else(|e| unreachable!("{e}"));
        let value: serde_json::Value = serde_json::from_str(&out).unwrap_or_default();
        assert_eq!(value["count"], 6);
    }
}
