//! `current_date` tool.

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use serde_json::json;

use crate::agent::tool::{NativeTool, ToolDefinition, ToolOutput};
use crate::error::AgentError;

/// Exposed tool name.
pub const TOOL_NAME: &str = "current_date";

/// Reports today's local date as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurrentDateTool {
    fixed: Option<NaiveDate>,
}

impl CurrentDateTool {
    /// Tool reading the system clock.
    #[must_use]
    pub const fn new() -> Self {
        Self { fixed: None }
    }

    /// Tool that always reports `date`.
    #[must_use]
    pub const fn fixed(date: NaiveDate) -> Self {
        Self { fixed: Some(date) }
    }

    /// Today's date, formatted.
    #[must_use]
    pub fn today(&self) -> String {
        self.fixed
            .unwrap_or_else(|| Local::now().date_naive())
            .format("%Y-%m-%d")
            .to_string()
    }
}

#[async_trait]
impl NativeTool for CurrentDateTool {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: TOOL_NAME.to_string(),
            description: "Returns today's date in YYYY-MM-DD format.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {},
                "additionalProperties": false
            }),
        }
    }

    async fn call(&self, _arguments: &str) -> Result<ToolOutput, AgentError> {
        Ok(ToolOutput::Text(self.today()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixed_date() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap_or_default();
        let output = CurrentDateTool::fixed(date).call("{}").await;
        assert!(matches!(output, Ok(ToolOutput::Text(ref t)) if t == "2025-03-07"));
    }

    #[test]
    fn test_system_date_shape() {
        let today = CurrentDateTool::new().today();
        assert_eq!(today.len(), 10);
        assert!(NaiveDate::parse_from_str(&today, "%Y-%m-%d").is_ok());
    }
}
