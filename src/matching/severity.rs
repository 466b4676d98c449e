//! Severity levels for sensitive word matches
//!
//! Every word gets a default severity derived from its length in characters.
//! Explicit overrides live in the dictionary store, not here.

use serde::{Deserialize, Serialize};

use crate::config::Locale;

/// Severity of a matched word, used for visual weighting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Short words (1-2 chars), most likely to be false positives
    Low,
    /// 3-4 chars
    Medium,
    /// 5+ chars
    High,
}

impl Severity {
    /// Derive the default severity from a word's character count
    pub fn from_char_len(len: usize) -> Self {
        match len {
            0..=2 => Severity::Low,
            3..=4 => Severity::Medium,
            _ => Severity::High,
        }
    }

    /// Derive the default severity for a word
    pub fn for_word(word: &str) -> Self {
        Self::from_char_len(word.chars().count())
    }

    /// Stable machine name ("low", "medium", "high")
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }

    /// Human readable label for hover content
    pub fn label(&self, locale: Locale) -> &'static str {
        match (locale, self) {
            (Locale::ZhCn, Severity::Low) => "低",
            (Locale::ZhCn, Severity::Medium) => "中",
            (Locale::ZhCn, Severity::High) => "高",
            (Locale::En, Severity::Low) => "Low",
            (Locale::En, Severity::Medium) => "Medium",
            (Locale::En, Severity::High) => "High",
        }
    }

    /// Decoration class applied by the text surface
    pub fn css_class(&self) -> &'static str {
        match self {
            Severity::Low => "sensitive-word-low",
            Severity::Medium => "sensitive-word-medium",
            Severity::High => "sensitive-word-high",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
