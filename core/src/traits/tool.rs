use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fault kinds a tool may raise during execution. None of them cross the
/// invoker boundary: every variant ends up as an error payload the model
/// can read and react to.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("upstream failure: {0}")]
    Upstream(String),
}

/// Successful tool return value: scalar text or a structured JSON value
/// (a record, or an ordered list of records).
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    Text(String),
    Structured(serde_json::Value),
}

impl ToolOutput {
    /// Canonical text form: structured values are JSON-encoded, scalar
    /// text passes through unchanged.
    pub fn render(&self) -> String {
        match self {
            ToolOutput::Text(text) => text.clone(),
            ToolOutput::Structured(value) => value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON Schema for the named arguments `execute` accepts. Arguments
    /// outside the schema are the tool's own job to reject.
    fn parameters_schema(&self) -> serde_json::Value;

    async fn execute(&self, args: serde_json::Value) -> Result<ToolOutput, ToolError>;

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn render_passes_text_through() {
        let output = ToolOutput::Text("dQw4w9WgXcQ".to_string());
        assert_eq!(output.render(), "dQw4w9WgXcQ");
    }

    #[test]
    fn render_encodes_structured_values() {
        let output = ToolOutput::Structured(json!({"title": "a", "views": 3}));
        let parsed: serde_json::Value = serde_json::from_str(&output.render()).unwrap();
        assert_eq!(parsed["views"], 3);
    }
}
