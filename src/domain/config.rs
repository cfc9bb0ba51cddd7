//! # Configuration
//!
//! Manages the loading and parsing of the application's configuration file
//! (`config.yaml`). The bot token may be given inline or, preferably, named
//! indirectly through an environment variable so the secret never lives in
//! the file.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Main application configuration structure.
/// Matches the layout of `data/config.yaml`.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub services: ServicesConfig,
}

/// Configuration for connected services.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ServicesConfig {
    #[serde(default)]
    pub telegram: TelegramConfig,
}

/// Specific configuration for the Telegram service.
#[derive(Debug, Deserialize, Clone)]
pub struct TelegramConfig {
    /// Bot token given inline. Prefer `token_env`.
    #[serde(default)]
    pub token: Option<String>,
    /// Environment variable holding the bot token.
    #[serde(default = "default_token_env")]
    pub token_env: String,
    /// Bot API base URL, overridable for tests and self-hosted servers.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Long-poll timeout for `getUpdates`, in seconds.
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: None,
            token_env: default_token_env(),
            api_base: default_api_base(),
            poll_timeout: default_poll_timeout(),
        }
    }
}

fn default_token_env() -> String {
    "BOT_TOKEN".to_string()
}

fn default_api_base() -> String {
    "https://api.telegram.org".to_string()
}

fn default_poll_timeout() -> u64 {
    50
}

impl AppConfig {
    /// Loads the configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_yaml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Resolves the bot token: inline value first, then the named
    /// environment variable.
    pub fn telegram_token(&self) -> Result<String> {
        if let Some(token) = &self.services.telegram.token
            && !token.is_empty()
        {
            return Ok(token.clone());
        }
        let var = &self.services.telegram.token_env;
        std::env::var(var)
            .with_context(|| format!("No telegram token in config and {var} is not set"))
    }
}
