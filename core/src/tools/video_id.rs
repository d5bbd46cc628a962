use crate::tools::extract_string_arg;
use crate::traits::{Tool, ToolError, ToolOutput};
use async_trait::async_trait;
use regex::Regex;
use serde_json::json;

/// Matches watch, share and embed URL forms.
const VIDEO_ID_PATTERN: &str = r"(?:v=|be/|embed/)([a-zA-Z0-9_-]{11})";

pub struct ExtractVideoIdTool {
    pattern: Regex,
}

impl ExtractVideoIdTool {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(VIDEO_ID_PATTERN).expect("valid pattern"),
        }
    }
}

impl Default for ExtractVideoIdTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for ExtractVideoIdTool {
    fn name(&self) -> &str {
        "extract_video_id"
    }

    fn description(&self) -> &str {
        "Extract the 11-character YouTube video id from a URL"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "A YouTube URL containing a video id"
                }
            },
            "required": ["url"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let url = extract_string_arg(&args, "url")?;
        match self.pattern.captures(url.trim()).and_then(|c| c.get(1)) {
            Some(m) => Ok(ToolOutput::Text(m.as_str().to_string())),
            None => Err(ToolError::InvalidInput(format!(
                "not a recognizable YouTube URL: {url}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn extract(url: &str) -> Result<ToolOutput, ToolError> {
        ExtractVideoIdTool::new()
            .execute(json!({ "url": url }))
            .await
    }

    #[tokio::test]
    async fn watch_share_and_embed_urls() {
        for url in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ?autoplay=1",
        ] {
            let output = extract(url).await.unwrap();
            assert_eq!(output.render(), "dQw4w9WgXcQ", "failed for {url}");
        }
    }

    #[tokio::test]
    async fn unrecognizable_url_is_invalid_input() {
        let err = extract("https://example.com/video").await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn missing_url_argument_is_invalid_input() {
        let err = ExtractVideoIdTool::new()
            .execute(json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));
    }
}
