use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub name: String,
    #[serde(default = "default_env")]
    pub env: String,
}

fn default_env() -> String {
    "dev".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    #[serde(default)]
    pub token: String,
    /// The single channel the bot listens on.
    pub channel_id: u64,
}

fn default_openai_base() -> String {
    "https://api.openai.com".to_string()
}

fn default_model() -> String {
    "gpt-5-nano".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_openai_base")]
    pub api_base: String,
    #[serde(default = "default_model")]
    pub model: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: default_openai_base(),
            model: default_model(),
        }
    }
}

fn default_search_base() -> String {
    "https://www.googleapis.com".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub cse_id: String,
    #[serde(default = "default_search_base")]
    pub api_base: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            cse_id: String::new(),
            api_base: default_search_base(),
        }
    }
}

fn default_db_path() -> String {
    "phlam.db".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

fn default_weather_base() -> String {
    "https://api.open-meteo.com".to_string()
}

fn default_prices_base() -> String {
    "https://api.chnwt.dev".to_string()
}

fn default_lottery_base() -> String {
    "https://lotto.api.rayriffy.com".to_string()
}

fn default_exchange_base() -> String {
    "https://open.er-api.com".to_string()
}

/// Base URLs for the quick-answer fetchers; overridable so tests can point
/// them at a mock server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturesConfig {
    #[serde(default = "default_weather_base")]
    pub weather_base: String,
    #[serde(default = "default_prices_base")]
    pub prices_base: String,
    #[serde(default = "default_lottery_base")]
    pub lottery_base: String,
    #[serde(default = "default_exchange_base")]
    pub exchange_base: String,
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            weather_base: default_weather_base(),
            prices_base: default_prices_base(),
            lottery_base: default_lottery_base(),
            exchange_base: default_exchange_base(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MainConfig {
    pub app: AppConfig,
    pub discord: DiscordConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub features: FeaturesConfig,
}

impl MainConfig {
    /// Secrets can live in the environment instead of the config file.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(token) = std::env::var("DISCORD_TOKEN") {
            if !token.is_empty() {
                self.discord.token = token;
            }
        }
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            if !key.is_empty() {
                self.openai.api_key = key;
            }
        }
        if let Ok(key) = std::env::var("GOOGLE_API_KEY") {
            if !key.is_empty() {
                self.search.api_key = key;
            }
        }
        if let Ok(id) = std::env::var("GOOGLE_CSE_ID") {
            if !id.is_empty() {
                self.search.cse_id = id;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.discord.token.is_empty() {
            anyhow::bail!("discord token missing (config or DISCORD_TOKEN)");
        }
        if self.discord.channel_id == 0 {
            anyhow::bail!("discord channel_id must be set");
        }
        if self.openai.api_key.is_empty() {
            anyhow::bail!("openai api_key missing (config or OPENAI_API_KEY)");
        }
        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<MainConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    let config: MainConfig = serde_yaml::from_str(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;
    Ok(config)
}
