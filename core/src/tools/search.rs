use crate::tools::{extract_string_arg, extract_usize_arg_opt, ytdlp};
use crate::traits::{Tool, ToolError, ToolOutput};
use async_trait::async_trait;
use serde_json::{Value, json};

const DEFAULT_RESULT_LIMIT: usize = 5;

pub struct SearchTool;

impl SearchTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SearchTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for SearchTool {
    fn name(&self) -> &str {
        "search_youtube"
    }

    fn description(&self) -> &str {
        "Search YouTube for videos matching a query"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search term to look for on YouTube"
                },
                "limit": {
                    "type": "integer",
                    "description": "Maximum number of results (default 5)"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let query = extract_string_arg(&args, "query")?;
        let limit = extract_usize_arg_opt(&args, "limit", DEFAULT_RESULT_LIMIT);
        if limit == 0 {
            return Err(ToolError::InvalidInput("limit must be at least 1".to_string()));
        }

        let probe = ytdlp::probe_flat(&format!("ytsearch{limit}:{query}")).await?;
        let results = ytdlp::video_entries(&probe, limit);
        Ok(ToolOutput::Structured(Value::Array(results)))
    }
}
