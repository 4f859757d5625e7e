use std::path::PathBuf;
use thiserror::Error;

use crate::llm::openai::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::llm::RetryPolicy;
use crate::memory::ContextWindow;
use crate::persist::DEFAULT_SAVE_FILE;

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const BASE_URL_VAR: &str = "OPENAI_BASE_URL";
pub const MODEL_VAR: &str = "REALMWEAVER_MODEL";
pub const SAVE_VAR: &str = "REALMWEAVER_SAVE";
pub const DATA_VAR: &str = "REALMWEAVER_DATA";
pub const PRUNE_VAR: &str = "REALMWEAVER_PRUNE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("OPENAI_API_KEY not set")]
    MissingApiKey,

    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Runtime settings for a game session
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    /// Where `save` and `load` read and write
    pub save_path: PathBuf,
    /// Directory holding optional prompt overrides under `prompts/`
    pub data_dir: PathBuf,
    /// Whether history is summarized once it grows past the window
    pub prune_enabled: bool,
    pub window: ContextWindow,
    pub retry: RetryPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            save_path: PathBuf::from(DEFAULT_SAVE_FILE),
            data_dir: PathBuf::from("./data"),
            prune_enabled: true,
            window: ContextWindow::default(),
            retry: RetryPolicy::default(),
        }
    }
}

impl Config {
    /// Read settings from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. The API key is the only required value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        config.api_key = lookup(API_KEY_VAR)
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        if let Some(base_url) = lookup(BASE_URL_VAR) {
            config.base_url = base_url;
        }
        if let Some(model) = lookup(MODEL_VAR) {
            config.model = model;
        }
        if let Some(path) = lookup(SAVE_VAR) {
            config.save_path = PathBuf::from(path);
        }
        if let Some(dir) = lookup(DATA_VAR) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(prune) = lookup(PRUNE_VAR) {
            config.prune_enabled = match prune.to_ascii_lowercase().as_str() {
                "on" | "true" | "1" => true,
                "off" | "false" | "0" => false,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: PRUNE_VAR,
                        value: prune,
                    })
                }
            };
        }

        Ok(config)
    }
}
