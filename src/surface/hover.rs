//! Hover resolution
//!
//! A hover at a char offset resolves to the match whose `[start, end)`
//! contains it. Overlaps are resolved deterministically: longest match
//! first, then lowest start offset, then the lexicographically smaller word.

use serde::Serialize;

use crate::config::Locale;
use crate::matching::{Match, Severity};

/// Content shown when hovering a highlighted word
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HoverContent {
    pub word: String,
    pub severity: Severity,
    pub severity_label: &'static str,
    pub message: &'static str,
}

/// Answers hover queries from a match list
#[derive(Clone, Copy, Debug, Default)]
pub struct HoverResolver {
    locale: Locale,
}

impl HoverResolver {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    /// Fixed advisory text for the configured locale
    pub fn advisory(&self) -> &'static str {
        match self.locale {
            Locale::ZhCn => "该词可能涉及敏感内容，建议修改或删除。",
            Locale::En => "This word may be sensitive. Consider revising or removing it.",
        }
    }

    /// Resolve a hover at `offset`
    pub fn resolve(&self, matches: &[Match], offset: usize) -> Option<HoverContent> {
        let best = matches
            .iter()
            .filter(|m| m.contains(offset))
            .min_by(|a, b| {
                b.len()
                    .cmp(&a.len())
                    .then(a.start_index.cmp(&b.start_index))
                    .then_with(|| a.word.cmp(&b.word))
            })?;

        Some(HoverContent {
            word: best.word.clone(),
            severity: best.severity,
            severity_label: best.severity.label(self.locale),
            message: self.advisory(),
        })
    }
}
