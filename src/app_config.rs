use anyhow::{Context, Result};
use log::{warn, LevelFilter};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::errors::AppError;
use crate::frame::ReorderKey;
use crate::language_utils;
use crate::translation::MIN_CHARS_PER_REQUEST;

/// Most retries accepted per request; the backoff doubles with each one
pub const MAX_RETRY_COUNT: u32 = 10;

/// Application configuration module
/// This module handles loading, validating and saving `conf.json`.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Source language code (ISO)
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target language code (ISO)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Timing edit config
    #[serde(default)]
    pub editing: EditingConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TranslationConfig {
    // @field: Model name
    #[serde(default = "default_model")]
    pub model: String,

    // @field: Ollama service URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    // @field: Max concurrent requests
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,

    // @field: Max chars per request
    #[serde(default = "default_max_chars_per_request")]
    pub max_chars_per_request: usize,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retry count for failed requests
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Backoff base for retries (in milliseconds), doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Temperature parameter for text generation (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// System prompt sent with every request
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Retry lines one by one when a whole batch fails
    #[serde(default = "default_true")]
    pub retry_individual_lines: bool,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            endpoint: default_endpoint(),
            concurrent_requests: default_concurrent_requests(),
            max_chars_per_request: default_max_chars_per_request(),
            timeout_secs: default_timeout_secs(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            temperature: default_temperature(),
            system_prompt: default_system_prompt(),
            retry_individual_lines: true,
        }
    }
}

/// Settings for the timing commands
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EditingConfig {
    /// Extensions picked up when a directory is given
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Ordering used by `reorder` when none is given
    #[serde(default)]
    pub default_reorder: ReorderKey,
}

impl Default for EditingConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            default_reorder: ReorderKey::default(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn default_source_language() -> String {
    "en".to_string()
}

fn default_target_language() -> String {
    "fr".to_string()
}

fn default_model() -> String {
    "llama3.2:3b".to_string()
}

fn default_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_concurrent_requests() -> usize {
    4
}

fn default_max_chars_per_request() -> usize {
    1000
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000
}

fn default_temperature() -> f32 {
    0.3
}

fn default_true() -> bool {
    true
}

fn default_system_prompt() -> String {
    "You are a professional subtitle translator. Translate each line faithfully, keep it short enough to read on screen, and never merge or split lines.".to_string()
}

fn default_extensions() -> Vec<String> {
    vec!["srt".to_string(), "vtt".to_string(), "sbv".to_string()]
}

impl Config {
    /// Load the configuration from `path`, writing the defaults there first
    /// when the file does not exist yet
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let file = File::open(path).with_context(|| format!("Failed to open config file: {:?}", path))?;
            let config = serde_json::from_reader(BufReader::new(file))
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            return Ok(config);
        }

        warn!("Config file not found at {:?}, creating default config.", path);
        let config = Self::default();
        config.save(path)?;
        Ok(config)
    }

    /// Save the configuration as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let config_json = serde_json::to_string_pretty(self).context("Failed to serialize config to JSON")?;
        std::fs::write(path.as_ref(), config_json)
            .with_context(|| format!("Failed to write config to file: {:?}", path.as_ref()))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<(), AppError> {
        for code in [&self.source_language, &self.target_language] {
            language_utils::validate_language_code(code).map_err(|e| AppError::Config(e.to_string()))?;
        }

        let endpoint = url::Url::parse(&self.translation.endpoint)
            .map_err(|e| AppError::Config(format!("Invalid endpoint '{}': {}", self.translation.endpoint, e)))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(AppError::Config(format!(
                "Endpoint must use http or https: {}",
                self.translation.endpoint
            )));
        }

        if self.translation.model.trim().is_empty() {
            return Err(AppError::Config("Translation model must not be empty".to_string()));
        }
        if self.translation.concurrent_requests == 0 {
            return Err(AppError::Config("concurrent_requests must be at least 1".to_string()));
        }
        if self.translation.max_chars_per_request < MIN_CHARS_PER_REQUEST {
            return Err(AppError::Config(format!(
                "max_chars_per_request must be at least {}",
                MIN_CHARS_PER_REQUEST
            )));
        }
        if self.translation.retry_count > MAX_RETRY_COUNT {
            return Err(AppError::Config(format!("retry_count must be at most {}", MAX_RETRY_COUNT)));
        }
        if !(0.0..=1.0).contains(&self.translation.temperature) {
            return Err(AppError::Config("temperature must be between 0.0 and 1.0".to_string()));
        }
        if self.editing.extensions.is_empty() {
            return Err(AppError::Config("At least one subtitle extension is required".to_string()));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: default_source_language(),
            target_language: default_target_language(),
            translation: TranslationConfig::default(),
            editing: EditingConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
