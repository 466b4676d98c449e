//! Dictionary Store
//!
//! Owns the active word set, per-word severity overrides, and the automaton
//! built from them. The automaton is rebuilt only when the word set actually
//! changes, and always from a fully normalized set.

use std::collections::{BTreeSet, HashMap};

use log::debug;

use super::{normalize_words, Match, PatternAutomaton, Severity};

/// Active dictionary plus its compiled automaton
#[derive(Clone, Debug, Default)]
pub struct DictionaryStore {
    words: BTreeSet<String>,
    overrides: HashMap<String, Severity>,
    automaton: PatternAutomaton,
    /// Bumped on every rebuild
    generation: u64,
}

impl DictionaryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store loaded with `words`
    pub fn with_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut store = Self::new();
        store.load(words);
        store
    }

    /// Replace the whole word set
    ///
    /// Overrides survive for words that remain present.
    pub fn load<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words: BTreeSet<String> = normalize_words(words).into_iter().collect();
        self.overrides.retain(|word, _| words.contains(word));
        self.words = words;
        self.rebuild();
    }

    /// Add words; returns false (and skips the rebuild) when nothing was new
    pub fn add_words<I, S>(&mut self, words: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut changed = false;
        for word in normalize_words(words) {
            changed |= self.words.insert(word);
        }

        if changed {
            self.rebuild();
        }
        changed
    }

    /// Remove words; returns false (and skips the rebuild) when none were present
    pub fn remove_words<I, S>(&mut self, words: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut changed = false;
        for word in normalize_words(words) {
            if self.words.remove(&word) {
                self.overrides.remove(&word);
                changed = true;
            }
        }

        if changed {
            self.rebuild();
        }
        changed
    }

    /// Override the severity of an active word
    ///
    /// Returns false, storing nothing, when the word is not in the dictionary.
    pub fn set_severity(&mut self, word: &str, severity: Severity) -> bool {
        let word = word.trim();
        if !self.words.contains(word) {
            debug!("Ignoring severity override for unknown word '{}'", word);
            return false;
        }
        self.overrides.insert(word.to_string(), severity);
        true
    }

    /// Effective severity: the override if present, else derived from length
    pub fn get_severity(&self, word: &str) -> Severity {
        let word = word.trim();
        self.overrides
            .get(word)
            .copied()
            .unwrap_or_else(|| Severity::for_word(word))
    }

    /// Scan `text` and attach severities to every hit
    pub fn detect(&self, text: &str) -> Vec<Match> {
        self.automaton
            .search(text)
            .into_iter()
            .map(|hit| Match {
                word: hit.word.to_string(),
                start_index: hit.start,
                end_index: hit.end,
                severity: self.get_severity(hit.word),
            })
            .collect()
    }

    /// Whether `word` is in the active set
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    /// Active words in sorted order
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }

    /// Number of active words
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// True when no words are active
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Number of rebuilds so far
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn rebuild(&mut self) {
        // Built aside, then swapped in whole
        let automaton = PatternAutomaton::from_patterns(&self.words);
        self.automaton = automaton;
        self.generation += 1;
        debug!(
            "Dictionary rebuilt: {} words, {} states (generation {})",
            self.words.len(),
            self.automaton.node_count(),
            self.generation
        );
    }
}
