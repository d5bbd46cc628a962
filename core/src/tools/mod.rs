use crate::agent::{RegistryError, ToolRegistry};
use crate::config::Config;
use crate::traits::ToolError;
use serde_json::Value;
use std::sync::Arc;

pub mod channel;
pub mod metadata;
pub mod playlist;
pub mod search;
pub mod transcript;
pub mod video_id;
pub(crate) mod ytdlp;

pub use channel::ChannelInfoTool;
pub use metadata::{MetadataTool, ThumbnailsTool};
pub use playlist::{PlaylistInfoTool, PlaylistVideosTool};
pub use search::SearchTool;
pub use transcript::{ListTranscriptLanguagesTool, TranscriptTool, TranscriptWithTimestampsTool};
pub use video_id::ExtractVideoIdTool;

pub fn extract_string_arg(args: &Value, key: &str) -> Result<String, ToolError> {
    args.get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ToolError::InvalidInput(format!("missing '{key}' parameter")))
        .map(|s| s.to_string())
}

pub fn extract_string_arg_opt(args: &Value, key: &str, default: &str) -> String {
    args.get(key)
        .and_then(|v| v.as_str())
        .unwrap_or(default)
        .to_string()
}

pub fn extract_usize_arg_opt(args: &Value, key: &str, default: usize) -> usize {
    args.get(key)
        .and_then(|v| v.as_u64())
        .map(|v| v as usize)
        .unwrap_or(default)
}

/// Install the full YouTube tool set in its canonical order.
pub fn register_all(registry: &ToolRegistry, config: &Config) -> Result<(), RegistryError> {
    registry.register(Arc::new(ExtractVideoIdTool::new()))?;
    registry.register(Arc::new(TranscriptTool::new(&config.transcript_language)))?;
    registry.register(Arc::new(SearchTool::new()))?;
    registry.register(Arc::new(MetadataTool::new()))?;
    registry.register(Arc::new(ThumbnailsTool::new()))?;
    registry.register(Arc::new(ChannelInfoTool::new()))?;
    registry.register(Arc::new(PlaylistInfoTool::new()))?;
    registry.register(Arc::new(PlaylistVideosTool::new()))?;
    registry.register(Arc::new(TranscriptWithTimestampsTool::new(
        &config.transcript_language,
    )))?;
    registry.register(Arc::new(ListTranscriptLanguagesTool::new()))?;
    Ok(())
}
