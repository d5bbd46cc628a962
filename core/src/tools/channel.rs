use crate::tools::{extract_string_arg, ytdlp};
use crate::traits::{Tool, ToolError, ToolOutput};
use async_trait::async_trait;
use serde_json::{Value, json};

/// Accepts a full URL, an @handle, a bare handle or a UC… channel id.
fn channel_url(input: &str) -> String {
    let input = input.trim();
    if input.starts_with("http://") || input.starts_with("https://") {
        input.to_string()
    } else if let Some(handle) = input.strip_prefix('@') {
        format!("https://www.youtube.com/@{handle}")
    } else if input.starts_with("UC") && input.len() == 24 {
        format!("https://www.youtube.com/channel/{input}")
    } else {
        format!("https://www.youtube.com/@{input}")
    }
}

fn channel_record(probe: &Value) -> Value {
    json!({
        "name": probe
            .get("channel")
            .or_else(|| probe.get("uploader"))
            .or_else(|| probe.get("title")),
        "channel_id": probe.get("channel_id"),
        "url": probe
            .get("channel_url")
            .or_else(|| probe.get("webpage_url")),
        "subscribers": probe.get("channel_follower_count"),
        "description": probe.get("description"),
        "video_count": probe
            .get("playlist_count")
            .cloned()
            .or_else(|| {
                probe
                    .get("entries")
                    .and_then(Value::as_array)
                    .map(|entries| json!(entries.len()))
            })
            .unwrap_or(Value::Null),
    })
}

pub struct ChannelInfoTool;

impl ChannelInfoTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ChannelInfoTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for ChannelInfoTool {
    fn name(&self) -> &str {
        "get_channel_info"
    }

    fn description(&self) -> &str {
        "Look up a YouTube channel by URL, @handle or channel id"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "channel": {
                    "type": "string",
                    "description": "Channel URL, @handle or UC… channel id"
                }
            },
            "required": ["channel"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let channel = extract_string_arg(&args, "channel")?;
        let probe = ytdlp::probe_flat(&channel_url(&channel)).await?;
        Ok(ToolOutput::Structured(channel_record(&probe)))
    }
}
