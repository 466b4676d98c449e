//! Matching module for content screening
//!
//! This module provides:
//! - Aho-Corasick automaton over char offsets
//! - Dictionary store with severity overrides
//! - Match spans handed to the text surface

pub mod automaton;
pub mod dictionary;
pub mod severity;

pub use automaton::{Hit, PatternAutomaton};
pub use dictionary::DictionaryStore;
pub use severity::Severity;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// One sensitive word occurrence in the scanned text
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    /// The matched word
    pub word: String,
    /// Char offset of the first char
    pub start_index: usize,
    /// Char offset one past the last char
    pub end_index: usize,
    /// Severity at detection time
    pub severity: Severity,
}

impl Match {
    /// Length in chars
    pub fn len(&self) -> usize {
        self.end_index - self.start_index
    }

    /// True for a zero-width span (never produced by the automaton)
    pub fn is_empty(&self) -> bool {
        self.start_index == self.end_index
    }

    /// Whether `offset` falls inside `[start_index, end_index)`
    pub fn contains(&self, offset: usize) -> bool {
        self.start_index <= offset && offset < self.end_index
    }
}

/// Trim, drop blanks and deduplicate a word list
///
/// The result is sorted, which keeps automaton construction deterministic.
pub fn normalize_words<I, S>(words: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    words
        .into_iter()
        .filter_map(|w| {
            let trimmed = w.as_ref().trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_words() {
        let words = normalize_words(["b", " a ", "", "\t", "b", "a"]);
        assert_eq!(words, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_match_contains() {
        let m = Match {
            word: "暴力".to_string(),
            start_index: 2,
            end_index: 4,
            severity: Severity::Low,
        };
        assert!(!m.contains(1));
        assert!(m.contains(2));
        assert!(m.contains(3));
        assert!(!m.contains(4));
        assert_eq!(m.len(), 2);
    }

    #[test]
    fn test_match_serializes_camel_case() {
        let m = Match {
            word: "ab".to_string(),
            start_index: 1,
            end_index: 3,
            severity: Severity::Low,
        };
        let json = serde_json::to_string(&m).unwrap();
        assert!(json.contains("\"startIndex\":1"));
        assert!(json.contains("\"endIndex\":3"));
        assert!(json.contains("\"severity\":\"low\""));
    }
}
