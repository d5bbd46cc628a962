//! Transcript retrieval: caption tracks are discovered through the
//! `yt-dlp` probe, then downloaded over HTTP in YouTube's json3 format.

use crate::tools::{extract_string_arg, extract_string_arg_opt, ytdlp};
use crate::traits::{Tool, ToolError, ToolOutput};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

fn caption_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .connect_timeout(std::time::Duration::from_secs(10))
        .build()
        .unwrap_or_default()
}

/// One caption track as reported by the probe.
#[derive(Debug, Clone)]
struct CaptionTrack {
    language: String,
    name: Option<String>,
    url: String,
    auto_generated: bool,
}

fn collect_tracks(probe: &Value) -> Vec<CaptionTrack> {
    // "subtitles" are uploader-provided, "automatic_captions" are ASR
    let mut tracks = Vec::new();
    for (field, auto_generated) in [("subtitles", false), ("automatic_captions", true)] {
        let Some(map) = probe.get(field).and_then(Value::as_object) else {
            continue;
        };
        for (language, renditions) in map {
            let Some(renditions) = renditions.as_array() else {
                continue;
            };
            let rendition = renditions
                .iter()
                .find(|r| r.get("ext").and_then(Value::as_str) == Some("json3"))
                .or_else(|| renditions.first());
            let Some(url) = rendition
                .and_then(|r| r.get("url"))
                .and_then(Value::as_str)
            else {
                continue;
            };
            tracks.push(CaptionTrack {
                language: language.clone(),
                name: rendition
                    .and_then(|r| r.get("name"))
                    .and_then(Value::as_str)
                    .map(str::to_string),
                url: url.to_string(),
                auto_generated,
            });
        }
    }
    tracks
}

/// Uploader tracks win over automatic ones; an exact language match wins
/// over a base-language match ("en" also accepts "en-US").
fn select_track<'a>(tracks: &'a [CaptionTrack], language: &str) -> Option<&'a CaptionTrack> {
    let matches = |track: &CaptionTrack| {
        track.language == language || track.language.split('-').next() == Some(language)
    };
    tracks
        .iter()
        .find(|t| !t.auto_generated && matches(t))
        .or_else(|| tracks.iter().find(|t| t.auto_generated && matches(t)))
}

#[derive(Debug, Deserialize)]
struct CaptionEvents {
    #[serde(default)]
    events: Vec<CaptionEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionEvent {
    #[serde(default)]
    t_start_ms: Option<u64>,
    #[serde(default)]
    d_duration_ms: Option<u64>,
    #[serde(default)]
    segs: Vec<CaptionSegment>,
}

#[derive(Debug, Deserialize)]
struct CaptionSegment {
    #[serde(default)]
    utf8: String,
}

fn event_text(event: &CaptionEvent) -> String {
    let text: String = event.segs.iter().map(|s| s.utf8.as_str()).collect();
    text.replace('\n', " ").trim().to_string()
}

fn plain_text(events: &CaptionEvents) -> String {
    events
        .events
        .iter()
        .map(event_text)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn timestamped(events: &CaptionEvents) -> Value {
    let entries: Vec<Value> = events
        .events
        .iter()
        .filter_map(|event| {
            let text = event_text(event);
            if text.is_empty() {
                return None;
            }
            Some(json!({
                "start": event.t_start_ms.unwrap_or(0) as f64 / 1000.0,
                "duration": event.d_duration_ms.unwrap_or(0) as f64 / 1000.0,
                "text": text,
            }))
        })
        .collect();
    Value::Array(entries)
}

async fn fetch_track(
    client: &reqwest::Client,
    track: &CaptionTrack,
) -> Result<CaptionEvents, ToolError> {
    // probe URLs normally carry the format already; force json3 otherwise
    let url = if track.url.contains("fmt=") {
        track.url.clone()
    } else {
        format!("{}&fmt=json3", track.url)
    };
    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| ToolError::Upstream(format!("caption download failed: {e}")))?;
    if !response.status().is_success() {
        return Err(ToolError::Upstream(format!(
            "caption download failed with status {}",
            response.status()
        )));
    }
    response
        .json()
        .await
        .map_err(|e| ToolError::Upstream(format!("unparseable caption data: {e}")))
}

async fn load_events(
    client: &reqwest::Client,
    video_id: &str,
    language: &str,
) -> Result<CaptionEvents, ToolError> {
    let probe = ytdlp::probe_video(&ytdlp::watch_url(video_id)).await?;
    let tracks = collect_tracks(&probe);
    let track = select_track(&tracks, language).ok_or_else(|| {
        if tracks.is_empty() {
            ToolError::NotFound(format!("video {video_id} has no transcripts"))
        } else {
            let available: Vec<&str> = tracks.iter().map(|t| t.language.as_str()).collect();
            ToolError::NotFound(format!(
                "no transcript in '{language}' for video {video_id} (available: {})",
                available.join(", ")
            ))
        }
    })?;
    fetch_track(client, track).await
}

fn transcript_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "video_id": {
                "type": "string",
                "description": "The YouTube video id, e.g. dQw4w9WgXcQ"
            },
            "language": {
                "type": "string",
                "description": "Transcript language code, e.g. en or es"
            }
        },
        "required": ["video_id"]
    })
}

pub struct TranscriptTool {
    client: reqwest::Client,
    default_language: String,
}

impl TranscriptTool {
    pub fn new(default_language: impl Into<String>) -> Self {
        Self {
            client: caption_client(),
            default_language: default_language.into(),
        }
    }
}

#[async_trait]
impl Tool for TranscriptTool {
    fn name(&self) -> &str {
        "fetch_transcript"
    }

    fn description(&self) -> &str {
        "Fetch the transcript text of a YouTube video"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        transcript_schema()
    }

    async fn execute(&self, args: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let video_id = extract_string_arg(&args, "video_id")?;
        let language = extract_string_arg_opt(&args, "language", &self.default_language);
        let events = load_events(&self.client, &video_id, &language).await?;
        Ok(ToolOutput::Text(plain_text(&events)))
    }
}

pub struct TranscriptWithTimestampsTool {
    client: reqwest::Client,
    default_language: String,
}

impl TranscriptWithTimestampsTool {
    pub fn new(default_language: impl Into<String>) -> Self {
        Self {
            client: caption_client(),
            default_language: default_language.into(),
        }
    }
}

#[async_trait]
impl Tool for TranscriptWithTimestampsTool {
    fn name(&self) -> &str {
        "fetch_transcript_with_timestamps"
    }

    fn description(&self) -> &str {
        "Fetch the transcript of a YouTube video as a list of {start, duration, text} segments"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        transcript_schema()
    }

    async fn execute(&self, args: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let video_id = extract_string_arg(&args, "video_id")?;
        let language = extract_string_arg_opt(&args, "language", &self.default_language);
        let events = load_events(&self.client, &video_id, &language).await?;
        Ok(ToolOutput::Structured(timestamped(&events)))
    }
}

pub struct ListTranscriptLanguagesTool;

impl ListTranscriptLanguagesTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ListTranscriptLanguagesTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for ListTranscriptLanguagesTool {
    fn name(&self) -> &str {
        "list_transcript_languages"
    }

    fn description(&self) -> &str {
        "List the transcript languages available for a YouTube video"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "video_id": {
                    "type": "string",
                    "description": "The YouTube video id"
                }
            },
            "required": ["video_id"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let video_id = extract_string_arg(&args, "video_id")?;
        let probe = ytdlp::probe_video(&ytdlp::watch_url(&video_id)).await?;
        let languages: Vec<Value> = collect_tracks(&probe)
            .into_iter()
            .map(|track| {
                json!({
                    "language": track.language,
                    "name": track.name,
                    "auto_generated": track.auto_generated,
                })
            })
            .collect();
        Ok(ToolOutput::Structured(Value::Array(languages)))
    }
}
