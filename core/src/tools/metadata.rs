use crate::tools::{extract_string_arg, ytdlp};
use crate::traits::{Tool, ToolError, ToolOutput};
use async_trait::async_trait;
use serde_json::{Value, json};

fn url_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "url": {
                "type": "string",
                "description": "YouTube video URL (any format)"
            }
        },
        "required": ["url"]
    })
}

fn metadata_record(probe: &Value) -> Value {
    json!({
        "title": probe.get("title"),
        "views": probe.get("view_count"),
        "duration": probe.get("duration"),
        "channel": probe.get("uploader"),
        "likes": probe.get("like_count"),
        "comments": probe.get("comment_count"),
        "chapters": probe.get("chapters").cloned().unwrap_or_else(|| json!([])),
        "published": published_date(probe),
    })
}

/// yt-dlp reports the upload date as YYYYMMDD.
fn published_date(probe: &Value) -> Value {
    probe
        .get("upload_date")
        .and_then(Value::as_str)
        .and_then(|raw| chrono::NaiveDate::parse_from_str(raw, "%Y%m%d").ok())
        .map(|date| json!(date.format("%Y-%m-%d").to_string()))
        .unwrap_or(Value::Null)
}

fn thumbnail_records(probe: &Value) -> Vec<Value> {
    let Some(thumbnails) = probe.get("thumbnails").and_then(Value::as_array) else {
        return Vec::new();
    };
    thumbnails
        .iter()
        .filter_map(|t| {
            let url = t.get("url").and_then(Value::as_str)?;
            let width = t.get("width").and_then(Value::as_u64);
            let height = t.get("height").and_then(Value::as_u64);
            let resolution = match (width, height) {
                (Some(w), Some(h)) => json!(format!("{w}x{h}")),
                _ => Value::Null,
            };
            Some(json!({
                "url": url,
                "width": width,
                "height": height,
                "resolution": resolution,
            }))
        })
        .collect()
}

pub struct MetadataTool;

impl MetadataTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MetadataTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for MetadataTool {
    fn name(&self) -> &str {
        "get_full_metadata"
    }

    fn description(&self) -> &str {
        "Extract metadata for a YouTube URL: title, views, duration, channel, likes, comments and chapters"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        url_schema()
    }

    async fn execute(&self, args: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let url = extract_string_arg(&args, "url")?;
        let probe = ytdlp::probe_video(&url).await?;
        Ok(ToolOutput::Structured(metadata_record(&probe)))
    }
}

pub struct ThumbnailsTool;

impl ThumbnailsTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ThumbnailsTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for ThumbnailsTool {
    fn name(&self) -> &str {
        "get_thumbnails"
    }

    fn description(&self) -> &str {
        "List the available thumbnails for a YouTube video, in YouTube's native order"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        url_schema()
    }

    async fn execute(&self, args: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let url = extract_string_arg(&args, "url")?;
        let probe = ytdlp::probe_video(&url).await?;
        Ok(ToolOutput::Structured(Value::Array(thumbnail_records(
            &probe,
        ))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_record_keeps_the_expected_keys() {
        let probe = json!({
            "title": "Some Video",
            "view_count": 12345,
            "duration": 212,
            "uploader": "Some Channel",
            "like_count": 99,
            "comment_count": 7,
            "chapters": [{"title": "Intro", "start_time": 0.0}],
            "upload_date": "20091025",
        });
        let record = metadata_record(&probe);
        assert_eq!(record["title"], "Some Video");
        assert_eq!(record["views"], 12345);
        assert_eq!(record["channel"], "Some Channel");
        assert_eq!(record["chapters"][0]["title"], "Intro");
        assert_eq!(record["published"], "2009-10-25");
    }

    #[test]
    fn absent_fields_are_null_not_missing() {
        let record = metadata_record(&json!({"title": "x"}));
        assert!(record["views"].is_null());
        assert!(record["published"].is_null());
        assert_eq!(record["chapters"], json!([]));
    }

    #[test]
    fn thumbnails_map_with_resolution() {
        let probe = json!({
            "thumbnails": [
                {"url": "https://i.ytimg.com/a.jpg", "width": 120, "height": 90},
                {"url": "https://i.ytimg.com/b.jpg"},
                {"no_url": true}
            ]
        });
        let records = thumbnail_records(&probe);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["resolution"], "120x90");
        assert!(records[1]["resolution"].is_null());
    }
}
