//! Role instructions for the research agents.
//!
//! Each role has a compiled-in default. A prompt directory may override any
//! of them file by file; see [`PromptSet::load`].

use std::path::{Path, PathBuf};

/// Instructions for the planning agent.
pub const PLANNER_PROMPT: &str = r"You are a research planning assistant.

Break the research request into a step-by-step plan grounded in the scientific method:
1. Restate the question and the decision it should inform.
2. List the sub-questions that must be answered, most important first.
3. For each sub-question, name the kinds of sources that would settle it and a few concrete search queries.
4. State what evidence would count as sufficient to stop researching.

Always explain the principles behind the plan (for example: triangulating sources, preferring primary data, separating facts from vendor claims).";

/// Instructions for the web search agent.
pub const WEB_SEARCHER_PROMPT: &str = r"You are a web search assistant.

Use the web_search tool to find information relevant to the instruction you are given. Run focused queries, refine them when results are thin, and avoid repeating a query you have already run.

Return what you found as concise bullet points. Every bullet must cite its source with title and URL. If the search tool reports a failure or finds nothing, say so plainly instead of guessing.";

/// Instructions for the reflection agent.
pub const REFLECTOR_PROMPT: &str = r"You are a reflection assistant.

Look back at the research gathered so far and judge it against the original goal:
- Which sub-questions are answered, and by which sources?
- Which are still open or rest on a single weak source?
- Are any findings contradictory or out of date?

Finish with a clear verdict: either 'sufficient' or 'insufficient', followed by the specific searches still needed when insufficient.";

/// Instructions for the synthesis agent.
pub const SYNTHESIZER_PROMPT: &str = r"You turn raw research notes into a clean knowledge base for a report writer.

Review every note and source you are given, then:
- Group insights into categories.
- Merge overlapping findings and remove duplicates.
- Resolve contradictions where the evidence allows; otherwise flag them.
- Flag uncertainties and weakly supported claims.
- Keep every citation (title and URL) attached to the insight it supports.

Return only the structured knowledge base.";

/// Instructions for the report writing agent.
pub const REPORT_WRITER_PROMPT: &str = r"You are the report writer.

Using the structured insights you are given, produce a professional research report:
- Open with an executive summary.
- Organize the body into clear sections and subheadings.
- Cite sources inline with their URLs.
- End with a conclusion and a references section.

Write in a professional, academic style suitable for clients or publication. Use Markdown.";

/// Instructions for the orchestrator. `{max_exchanges}` is replaced with
/// the configured exchange ceiling.
pub const ORCHESTRATOR_PROMPT: &str = r"You are the orchestrator of a deep research workflow.

For each research request:
1. Call current_date so the research is anchored in time.
2. Ask PlanningTool for a research plan.
3. Delegate searches to WebSearchTool, one focused instruction per call.
4. Use ReflectionTool to check whether the findings are sufficient and credible.
5. Pass all collected findings to SynthesisTool to merge and organize them.
6. Pass the synthesized insights to ReportWriterTool to draft the final report.

Sub-agents only see the instruction you send them, so include the findings they need in it.
ReportWriterTool is only available after SynthesisTool has succeeded. Its output is the final report and ends the workflow.

Stopping rules:
- Once you have enough evidence to answer the request with citations, move on to synthesis and the report.
- Do not keep asking for searches once a reasonable, well-cited answer is possible.
- Never exceed {max_exchanges} exchanges with other agents. If the goal is not fully met by then, write the best summary you can and stop.";

const PLACEHOLDER_MAX_EXCHANGES: &str = "{max_exchanges}";

/// Default prompt directory under the user's home.
const DEFAULT_PROMPT_DIR: &str = ".config/deep-research/prompts";

const PLANNER_FILENAME: &str = "planner.md";
const WEB_SEARCHER_FILENAME: &str = "web_searcher.md";
const REFLECTOR_FILENAME: &str = "reflector.md";
const SYNTHESIZER_FILENAME: &str = "synthesizer.md";
const REPORT_WRITER_FILENAME: &str = "report_writer.md";
const ORCHESTRATOR_FILENAME: &str = "orchestrator.md";

const TEMPLATES: [(&str, &str); 6] = [
    (PLANNER_FILENAME, PLANNER_PROMPT),
    (WEB_SEARCHER_FILENAME, WEB_SEARCHER_PROMPT),
    (REFLECTOR_FILENAME, REFLECTOR_PROMPT),
    (SYNTHESIZER_FILENAME, SYNTHESIZER_PROMPT),
    (REPORT_WRITER_FILENAME, REPORT_WRITER_PROMPT),
    (ORCHESTRATOR_FILENAME, ORCHESTRATOR_PROMPT),
];

/// Instructions for every role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSet {
    /// Planning agent.
    pub planner: String,
    /// Web search agent.
    pub web_searcher: String,
    /// Reflection agent.
    pub reflector: String,
    /// Synthesis agent.
    pub synthesizer: String,
    /// Report writing agent.
    pub report_writer: String,
    /// Orchestrator, still containing the `{max_exchanges}` placeholder.
    pub orchestrator: String,
}

impl PromptSet {
    /// Loads prompts, falling back to the defaults file by file.
    ///
    /// The directory is `prompt_dir` if given, else `RESEARCH_PROMPT_DIR`,
    /// else `~/.config/deep-research/prompts/`.
    #[must_use]
    pub fn load(prompt_dir: Option<&Path>) -> Self {
        let dir = prompt_dir
            .map(Path::to_path_buf)
            .or_else(|| std::env::var("RESEARCH_PROMPT_DIR").ok().map(PathBuf::from))
            .or_else(Self::default_dir);

        let read = |filename: &str, default: &str| {
            dir.as_ref()
                .and_then(|d| std::fs::read_to_string(d.join(filename)).ok())
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            planner: read(PLANNER_FILENAME, PLANNER_PROMPT),
            web_searcher: read(WEB_SEARCHER_FILENAME, WEB_SEARCHER_PROMPT),
            reflector: read(REFLECTOR_FILENAME, REFLECTOR_PROMPT),
            synthesizer: read(SYNTHESIZER_FILENAME, SYNTHESIZER_PROMPT),
            report_writer: read(REPORT_WRITER_FILENAME, REPORT_WRITER_PROMPT),
            orchestrator: read(ORCHESTRATOR_FILENAME, ORCHESTRATOR_PROMPT),
        }
    }

    /// Compiled-in defaults.
    #[must_use]
    pub fn defaults() -> Self {
        Self {
            planner: PLANNER_PROMPT.to_string(),
            web_searcher: WEB_SEARCHER_PROMPT.to_string(),
            reflector: REFLECTOR_PROMPT.to_string(),
            synthesizer: SYNTHESIZER_PROMPT.to_string(),
            report_writer: REPORT_WRITER_PROMPT.to_string(),
            orchestrator: ORCHESTRATOR_PROMPT.to_string(),
        }
    }

    /// Orchestrator instructions with the exchange ceiling filled in.
    #[must_use]
    pub fn orchestrator_for(&self, max_exchanges: usize) -> String {
        self.orchestrator
            .replace(PLACEHOLDER_MAX_EXCHANGES, &max_exchanges.to_string())
    }

    /// Writes the default templates into `dir`, leaving existing files
    /// untouched. Returns the paths written.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory or a file cannot be written.
    pub fn write_defaults(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;

        let mut written = Vec::new();
        for (filename, content) in TEMPLATES {
            let path = dir.join(filename);
            if !path.exists() {
                std::fs::write(&path, content)?;
                written.push(path);
            }
        }
        Ok(written)
    }

    /// `~/.config/deep-research/prompts/`, if the home directory is known.
    #[must_use]
    pub fn default_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(DEFAULT_PROMPT_DIR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orchestrator_placeholder_filled() {
        let prompt = PromptSet::defaults().orchestrator_for(7);
        assert!(prompt.contains("Never exceed 7 exchanges"));
        assert!(!prompt.contains(PLACEHOLDER_MAX_EXCHANGES));
    }

    #[test]
    fn test_load_overrides_single_file() {
        let dir = tempfile::tempdir().unwrap_or_else(|_| unreachable!());
        std::fs::write(dir.path().join(PLANNER_FILENAME), "Custom planner.")
            .unwrap_or_else(|_| unreachable!());

        let prompts = PromptSet::load(Some(dir.path()));

        assert_eq!(prompts.planner, "Custom planner.");
        assert_eq!(prompts.reflector, REFLECTOR_PROMPT);
        assert_eq!(prompts.orchestrator, ORCHESTRATOR_PROMPT);
    }

    #[test]
    fn test_empty_override_uses_default() {
        let dir = tempfile::tempdir().unwrap_or_else(|_| unreachable!());
        std::fs::write(dir.path().join(SYNTHESIZER_FILENAME), "  \n")
            .unwrap_or_else(|_| unreachable!());

        let prompts = PromptSet::load(Some(dir.path()));
        assert_eq!(prompts.synthesizer, SYNTHESIZER_PROMPT);
    }

    #[test]
    fn test_write_defaults_does_not_overwrite() {
        let dir = tempfile::tempdir().unwrap_or_else(|_| unreachable!());
        let target = dir.path().join("prompts");
        std::fs::create_dir_all(&target).unwrap_or_else(|_| unreachable!());
        std::fs::write(target.join(REPORT_WRITER_FILENAME), "mine")
            .unwrap_or_else(|_| unreachable!());

        let written = PromptSet::write_defaults(&target).unwrap_or_else(|_| unreachable!());

        assert_eq!(written.len(), TEMPLATES.len() - 1);
        let kept = std::fs::read_to_string(target.join(REPORT_WRITER_FILENAME)).unwrap_or_default();
        assert_eq!(kept, "mine");
        assert_eq!(PromptSet::load(Some(&target)).report_writer, "mine");
    }

    #[test]
    fn test_round_trip_through_directory() {
        let dir = tempfile::tempdir().unwrap_or_else(|_| unreachable!());
        PromptSet::write_defaults(dir.path()).unwrap_or_else(|_| unreachable!());
        assert_eq!(PromptSet::load(Some(dir.path())), PromptSet::defaults());
    }
}
