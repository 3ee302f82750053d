//! Configuration management for meme-bot

#[path = "config_tests.rs"]
mod config_tests;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::str::FromStr;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TENOR_BASE_URL: &str = "https://tenor.googleapis.com/v2/search";

/// Source of environment variables. Swapped for an in-memory map in tests.
pub trait ReadEnv {
    fn var(&self, key: &str) -> Option<String>;
}

/// Reads from the process environment.
pub struct SystemEnv;

impl ReadEnv for SystemEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Complete bot configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub discord: DiscordBotConfig,
    #[serde(default)]
    pub recommend: RecommendConfig,
    #[serde(default)]
    pub reasoning: ReasoningConfig,
    #[serde(default)]
    pub media: MediaConfig,
}

/// Discord connection and command surface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordBotConfig {
    /// Bot token from the Discord developer portal
    #[serde(default)]
    pub bot_token: String,
    /// Prefix that marks a message as a bot command
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,
}

/// Tuning for the recommendation pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendConfig {
    /// Independent per-message chance of an automatic recommendation.
    #[serde(default = "default_auto_probability")]
    pub auto_probability: f64,
    /// Messages remembered per channel.
    #[serde(default = "default_context_capacity")]
    pub context_capacity: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningProvider {
    Gemini,
    OpenAi,
}

impl FromStr for ReasoningProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "gemini" => Ok(ReasoningProvider::Gemini),
            "openai" => Ok(ReasoningProvider::OpenAi),
            other => bail!("unknown reasoning provider: {}", other),
        }
    }
}

/// Language-model backends used for mood analysis. All optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningConfig {
    /// Force a backend. When unset Gemini wins over OpenAI.
    #[serde(default)]
    pub provider: Option<ReasoningProvider>,
    #[serde(default)]
    pub gemini_api_key: Option<String>,
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,
    #[serde(default = "default_gemini_base_url")]
    pub gemini_base_url: String,
    #[serde(default)]
    pub openai_api_key: Option<String>,
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,
    /// Attempts per request on 429 / 5xx / transport errors.
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

/// GIF search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    #[serde(default)]
    pub tenor_api_key: Option<String>,
    #[serde(default = "default_tenor_base_url")]
    pub tenor_base_url: String,
    #[serde(default = "default_result_limit")]
    pub result_limit: u32,
    /// Served when the search is unavailable or returns nothing usable.
    #[serde(default = "default_fallback_gifs")]
    pub fallback_gifs: Vec<String>,
}

/// Which credentials are present. Only presence matters to the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CredentialStatus {
    pub discord: bool,
    pub gemini: bool,
    pub openai: bool,
    pub tenor: bool,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn from_env<E: ReadEnv>(env: &E) -> Result<Self> {
        let bot_token = env.var("DISCORD_TOKEN").unwrap_or_default();
        let command_prefix = env
            .var("MEME_COMMAND_PREFIX")
            .unwrap_or_else(default_command_prefix);

        let auto_probability =
            parse_var(env, "MEME_AUTO_PROBABILITY")?.unwrap_or_else(default_auto_probability);
        let context_capacity =
            parse_var(env, "MEME_CONTEXT_CAPACITY")?.unwrap_or_else(default_context_capacity);

        let provider = parse_var(env, "REASONING_PROVIDER")?;
        let retry_attempts =
            parse_var(env, "REASONING_RETRY_ATTEMPTS")?.unwrap_or_else(default_retry_attempts);
        let result_limit = parse_var(env, "TENOR_RESULT_LIMIT")?.unwrap_or_else(default_result_limit);

        Ok(Config {
            discord: DiscordBotConfig {
                bot_token,
                command_prefix,
            },
            recommend: RecommendConfig {
                auto_probability,
                context_capacity,
            },
            reasoning: ReasoningConfig {
                provider,
                gemini_api_key: env.var("GEMINI_API_KEY"),
                gemini_model: env.var("GEMINI_MODEL").unwrap_or_else(default_gemini_model),
                openai_api_key: env.var("OPENAI_API_KEY"),
                openai_model: env.var("OPENAI_MODEL").unwrap_or_else(default_openai_model),
                retry_attempts,
                ..ReasoningConfig::default()
            },
            media: MediaConfig {
                tenor_api_key: env.var("TENOR_API_KEY"),
                result_limit,
                ..MediaConfig::default()
            },
        })
    }

    /// Check value ranges. The Discord token is only needed to connect.
    pub fn validate(&self, require_token: bool) -> Result<()> {
        if require_token && self.discord.bot_token.trim().is_empty() {
            bail!("DISCORD_TOKEN not set");
        }
        if self.discord.command_prefix.is_empty() {
            bail!("command_prefix must not be empty");
        }
        let p = self.recommend.auto_probability;
        if !(0.0..=1.0).contains(&p) {
            bail!("auto_probability must be between 0 and 1, got {}", p);
        }
        if self.recommend.context_capacity == 0 {
            bail!("context_capacity must be at least 1");
        }
        Ok(())
    }

    pub fn credentials(&self) -> CredentialStatus {
        CredentialStatus {
            discord: !self.discord.bot_token.trim().is_empty(),
            gemini: self.reasoning.gemini_key().is_some(),
            openai: self.reasoning.openai_key().is_some(),
            tenor: self.media.tenor_key().is_some(),
        }
    }
}

impl ReasoningConfig {
    pub fn gemini_key(&self) -> Option<&str> {
        non_blank(&self.gemini_api_key)
    }

    pub fn openai_key(&self) -> Option<&str> {
        non_blank(&self.openai_api_key)
    }

    /// Backend to use, if any credential allows one.
    ///
    /// A forced provider without its credential yields `None` rather than
    /// silently switching to the other backend.
    pub fn active_provider(&self) -> Option<ReasoningProvider> {
        match self.provider {
            Some(ReasoningProvider::Gemini) => self.gemini_key().map(|_| ReasoningProvider::Gemini),
            Some(ReasoningProvider::OpenAi) => self.openai_key().map(|_| ReasoningProvider::OpenAi),
            None if self.gemini_key().is_some() => Some(ReasoningProvider::Gemini),
            None if self.openai_key().is_some() => Some(ReasoningProvider::OpenAi),
            None => None,
        }
    }
}

impl MediaConfig {
    pub fn tenor_key(&self) -> Option<&str> {
        non_blank(&self.tenor_api_key)
    }
}

impl Default for DiscordBotConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            command_prefix: default_command_prefix(),
        }
    }
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            auto_probability: default_auto_probability(),
            context_capacity: default_context_capacity(),
        }
    }
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            provider: None,
            gemini_api_key: None,
            gemini_model: default_gemini_model(),
            gemini_base_url: default_gemini_base_url(),
            openai_api_key: None,
            openai_model: default_openai_model(),
            openai_base_url: default_openai_base_url(),
            retry_attempts: default_retry_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            tenor_api_key: None,
            tenor_base_url: default_tenor_base_url(),
            result_limit: default_result_limit(),
            fallback_gifs: default_fallback_gifs(),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_var<E, T>(env: &E, key: &str) -> Result<Option<T>>
where
    E: ReadEnv,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env.var(key).filter(|v| !v.trim().is_empty()) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("Invalid value for {}: {} ({})", key, raw, e)),
        None => Ok(None),
    }
}

fn default_command_prefix() -> String {
    "!".to_string()
}

fn default_auto_probability() -> f64 {
    0.15
}

fn default_context_capacity() -> usize {
    10
}

fn default_gemini_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_gemini_base_url() -> String {
    DEFAULT_GEMINI_BASE_URL.to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_openai_base_url() -> String {
    DEFAULT_OPENAI_BASE_URL.to_string()
}

fn default_retry_attempts() -> u32 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    500
}

fn default_tenor_base_url() -> String {
    DEFAULT_TENOR_BASE_URL.to_string()
}

fn default_result_limit() -> u32 {
    10
}

fn default_fallback_gifs() -> Vec<String> {
    vec![
        "https://media.tenor.com/example1.gif".to_string(),
        "https://media.tenor.com/example2.gif".to_string(),
        "https://media.tenor.com/example3.gif".to_string(),
    ]
}
