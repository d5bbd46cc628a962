use crate::config::Config;
use crate::providers::{GeminiProvider, OpenAiProvider};
use crate::traits::Provider;
use anyhow::{Result, anyhow};
use std::sync::Arc;

pub fn create_provider(config: &Config) -> Result<Arc<dyn Provider>> {
    let provider_name = config.provider.as_deref().unwrap_or("gemini");

    match provider_name.to_lowercase().as_str() {
        "gemini" | "google" => {
            let api_key = resolve_api_key_with_fallback(
                &["GOOGLE_API_KEY", "GEMINI_API_KEY"],
                &config.api_key,
            )?;
            let mut provider = GeminiProvider::new(api_key).with_model(config.model.clone());
            if let Some(base_url) = &config.base_url {
                provider = provider.with_base_url(base_url.clone());
            }
            Ok(Arc::new(provider))
        }
        "openai" => {
            let api_key = resolve_api_key_with_fallback(&["OPENAI_API_KEY"], &config.api_key)?;
            let mut provider = OpenAiProvider::new(api_key).with_model(config.model.clone());
            if let Some(base_url) = &config.base_url {
                provider = provider.with_base_url(base_url.clone());
            }
            Ok(Arc::new(provider))
        }
        _ => Err(anyhow!(
            "Unknown provider: {provider_name}. Available: gemini, openai"
        )),
    }
}

fn resolve_api_key_with_fallback(env_vars: &[&str], config_key: &str) -> Result<String> {
    for var_name in env_vars {
        if let Ok(key) = std::env::var(var_name)
            && !key.is_empty()
        {
            return Ok(key);
        }
    }
    if !config_key.is_empty() {
        Ok(config_key.to_string())
    } else {
        Err(anyhow!(
            "No API key found: set {} or put api_key in the config file",
            env_vars.join(" or ")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_key_is_the_fallback() {
        let key = resolve_api_key_with_fallback(&["TUBER_TEST_UNSET_VAR"], "from-config").unwrap();
        assert_eq!(key, "from-config");
    }

    #[test]
    fn no_key_anywhere_is_an_error() {
        assert!(resolve_api_key_with_fallback(&["TUBER_TEST_UNSET_VAR"], "").is_err());
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let config = Config {
            provider: Some("mystery".to_string()),
            ..Config::default()
        };
        assert!(create_provider(&config).is_err());
    }
}
