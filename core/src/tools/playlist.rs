use crate::tools::{extract_string_arg, extract_usize_arg_opt, ytdlp};
use crate::traits::{Tool, ToolError, ToolOutput};
use async_trait::async_trait;
use serde_json::{Value, json};

/// Accepts a full playlist URL or a bare PL…/UU… playlist id.
fn playlist_url(input: &str) -> String {
    let input = input.trim();
    if input.starts_with("http://") || input.starts_with("https://") {
        input.to_string()
    } else {
        format!("https://www.youtube.com/playlist?list={input}")
    }
}

fn playlist_record(probe: &Value) -> Value {
    json!({
        "title": probe.get("title"),
        "playlist_id": probe.get("id"),
        "channel": probe
            .get("uploader")
            .or_else(|| probe.get("channel")),
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
        "description": probe.get("description"),
    })
}

fn playlist_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "url": {
                "type": "string",
                "description": "Playlist URL or playlist id"
            }
        },
        "required": ["url"]
    })
}

pub struct PlaylistInfoTool;

impl PlaylistInfoTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PlaylistInfoTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for PlaylistInfoTool {
    fn name(&self) -> &str {
        "get_playlist_info"
    }

    fn description(&self) -> &str {
        "Look up title, channel and size of a YouTube playlist"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        playlist_schema()
    }

    async fn execute(&self, args: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let url = extract_string_arg(&args, "url")?;
        let probe = ytdlp::probe_flat(&playlist_url(&url)).await?;
        Ok(ToolOutput::Structured(playlist_record(&probe)))
    }
}

pub struct PlaylistVideosTool;

impl PlaylistVideosTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PlaylistVideosTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for PlaylistVideosTool {
    fn name(&self) -> &str {
        "get_playlist_videos"
    }

    fn description(&self) -> &str {
        "List the videos of a YouTube playlist in playlist order"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "Playlist URL or playlist id"
                },
                "limit": {
                    "type": "integer",
                    "description": "Maximum number of entries (omit for all)"
                }
            },
            "required": ["url"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let url = extract_string_arg(&args, "url")?;
        let limit = extract_usize_arg_opt(&args, "limit", 0);
        let probe = ytdlp::probe_flat(&playlist_url(&url)).await?;
        Ok(ToolOutput::Structured(Value::Array(ytdlp::video_entries(
            &probe, limit,
        ))))
    }
}
