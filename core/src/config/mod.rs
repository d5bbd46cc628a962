use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const TUBER_DIR: &str = ".tuber";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub provider: Option<String>,
    pub api_key: String,
    pub base_url: Option<String>,
    pub model: String,
    pub max_rounds: usize,
    pub transcript_language: String,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            provider: None,
            api_key: String::new(),
            base_url: None,
            model: "gemini-3-pro-preview".to_string(),
            max_rounds: 10,
            transcript_language: "en".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load the config file when it exists, otherwise fall back to
    /// defaults (API keys can still come from the environment).
    pub fn load_or_init() -> Result<Self> {
        if config_exists() {
            load_config()
        } else {
            Ok(Config::default())
        }
    }
}

pub fn get_tuber_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(TUBER_DIR)
}

pub fn get_config_path() -> PathBuf {
    get_tuber_dir().join("config.toml")
}

pub fn ensure_tuber_dir() -> Result<PathBuf> {
    let tuber_dir = get_tuber_dir();

    if !tuber_dir.exists() {
        std::fs::create_dir_all(&tuber_dir).with_context(|| {
            format!(
                "Failed to create tuber directory at {}",
                tuber_dir.display()
            )
        })?;
    }

    Ok(tuber_dir)
}

pub fn load_config() -> Result<Config> {
    read_config(&get_config_path())
}

pub fn save_config(config: &Config) -> Result<()> {
    ensure_tuber_dir()?;
    write_config(config, &get_config_path())
}

pub fn config_exists() -> bool {
    get_config_path().exists()
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;

    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config from {}", path.display()))
}

fn write_config(config: &Config, path: &Path) -> Result<()> {
    let content =
        toml::to_string_pretty(config).with_context(|| "Failed to serialize config to TOML")?;

    std::fs::write(path, content)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    Ok(())
}
