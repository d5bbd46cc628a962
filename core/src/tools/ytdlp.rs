//! Shared `yt-dlp` subprocess plumbing for the YouTube tools.

use crate::traits::ToolError;
use serde_json::{Value, json};
use tokio::process::Command;
use tracing::debug;

const YTDLP_BIN: &str = "yt-dlp";

/// Probe a single video: full metadata, caption tracks, thumbnails.
pub(crate) async fn probe_video(url: &str) -> Result<Value, ToolError> {
    run(&["--dump-json", "--no-download", "--no-warnings", url]).await
}

/// Probe a playlist, channel or search URL without touching the entries
/// themselves.
pub(crate) async fn probe_flat(url: &str) -> Result<Value, ToolError> {
    run(&["--dump-single-json", "--flat-playlist", "--no-warnings", url]).await
}

async fn run(args: &[&str]) -> Result<Value, ToolError> {
    debug!(?args, "running {YTDLP_BIN}");
    let output = Command::new(YTDLP_BIN)
        .args(args)
        .output()
        .await
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ToolError::Upstream(format!("{YTDLP_BIN} is not installed or not on PATH"))
            } else {
                ToolError::Upstream(format!("failed to run {YTDLP_BIN}: {e}"))
            }
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(classify_failure(stderr.trim()));
    }

    serde_json::from_slice(&output.stdout)
        .map_err(|e| ToolError::Upstream(format!("unparseable {YTDLP_BIN} output: {e}")))
}

fn classify_failure(stderr: &str) -> ToolError {
    let lowered = stderr.to_lowercase();
    if lowered.contains("unavailable")
        || lowered.contains("not available")
        || lowered.contains("does not exist")
        || lowered.contains("404")
    {
        ToolError::NotFound(stderr.to_string())
    } else if lowered.contains("unsupported url") || lowered.contains("is not a valid url") {
        ToolError::InvalidInput(stderr.to_string())
    } else {
        ToolError::Upstream(stderr.to_string())
    }
}

pub(crate) fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

/// Map the entries of a flat probe into `{title, video_id, url}` records,
/// YouTube order preserved. `limit` of 0 means no truncation.
pub(crate) fn video_entries(probe: &Value, limit: usize) -> Vec<Value> {
    let Some(entries) = probe.get("entries").and_then(Value::as_array) else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|entry| {
            let id = entry.get("id").and_then(Value::as_str)?;
            Some(json!({
                "title": entry.get("title").and_then(Value::as_str).unwrap_or(""),
                "video_id": id,
                "url": format!("https://youtu.be/{id}"),
            }))
        })
        .take(if limit == 0 { usize::MAX } else { limit })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_video_maps_to_not_found() {
        let err = classify_failure("ERROR: [youtube] xyz: Video unavailable");
        assert!(matches!(err, ToolError::NotFound(_)));
    }

    #[test]
    fn bad_url_maps_to_invalid_input() {
        let err = classify_failure("ERROR: Unsupported URL: https://example.com");
        assert!(matches!(err, ToolError::InvalidInput(_)));
    }

    #[test]
    fn anything_else_is_upstream() {
        let err = classify_failure("ERROR: unable to download webpage (connection reset)");
        assert!(matches!(err, ToolError::Upstream(_)));
    }

    #[test]
    fn entries_map_in_order_with_limit() {
        let probe = json!({
            "entries": [
                {"id": "aaaaaaaaaaa", "title": "first"},
                {"id": "bbbbbbbbbbb", "title": "second"},
                {"id": "ccccccccccc", "title": "third"},
            ]
        });
        let all = video_entries(&probe, 0);
        assert_eq!(all.len(), 3);
        assert_eq!(all[0]["url"], "https://youtu.be/aaaaaaaaaaa");

        let two = video_entries(&probe, 2);
        assert_eq!(two.len(), 2);
        assert_eq!(two[1]["title"], "second");
    }

    #[test]
    fn missing_entries_yield_nothing() {
        assert!(video_entries(&json!({}), 0).is_empty());
    }
}
