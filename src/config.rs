//! Configuration module for content screening
//!
//! Configuration is handed over by the host as JSON bytes, NOT read from
//! files. The screening subsystem does no I/O of its own.

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::matching::Severity;

/// Screening configuration supplied by the host application
#[derive(Clone, Debug, Deserialize)]
pub struct ScreeningConfig {
    /// Master switch for the feature
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Initial dictionary (word list)
    #[serde(default = "default_dictionary")]
    pub dictionary: Vec<String>,

    /// Quiet period after the last edit before a detect is issued
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Explicit severities layered over the length-derived default
    #[serde(default)]
    pub severity_overrides: HashMap<String, Severity>,

    /// Largest text (in chars) the executor will scan
    #[serde(default = "default_max_text_chars")]
    pub max_text_chars: usize,

    /// Locale for hover labels
    #[serde(default)]
    pub locale: Locale,

    /// Whether to log matched words (for debugging)
    #[serde(default = "default_log_matches")]
    pub log_matches: bool,
}

/// Hover label locale
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "zh-CN")]
    ZhCn,
    #[serde(rename = "en")]
    En,
}

fn default_enabled() -> bool {
    true
}

fn default_dictionary() -> Vec<String> {
    vec![
        "暴力".to_string(),
        "色情".to_string(),
        "赌博".to_string(),
        "毒品".to_string(),
        "血腥".to_string(),
        "恐怖袭击".to_string(),
    ]
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_max_text_chars() -> usize {
    2_000_000
}

fn default_log_matches() -> bool {
    false
}

impl Default for ScreeningConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            dictionary: default_dictionary(),
            debounce_ms: default_debounce_ms(),
            severity_overrides: HashMap::new(),
            max_text_chars: default_max_text_chars(),
            locale: Locale::default(),
            log_matches: default_log_matches(),
        }
    }
}

impl ScreeningConfig {
    /// Parse configuration from JSON bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config_str =
            std::str::from_utf8(bytes).map_err(|e| ConfigError::InvalidUtf8(e.to_string()))?;

        let config: Self = serde_json::from_str(config_str)
            .map_err(|e| ConfigError::InvalidJson(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject values the controller cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.debounce_ms == 0 {
            return Err(ConfigError::InvalidDebounce);
        }
        Ok(())
    }

    /// Debounce interval as a `Duration`
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Configuration parsing errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid UTF-8: {0}")]
    InvalidUtf8(String),
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),
    #[error("debounce_ms must be greater than zero")]
    InvalidDebounce,
}
