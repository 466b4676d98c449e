//! Aho-Corasick Pattern Automaton
//!
//! Multi-pattern matching in a single linear pass over the text.
//! All trie nodes live in one arena (`Vec<Node>`); child edges and failure
//! links are both plain indices into it, so the failure graph needs no
//! shared ownership.
//!
//! - Build: O(total pattern length)
//! - Search: O(text length + number of matches)
//! - Positions are char offsets, not byte offsets

use std::collections::{HashMap, VecDeque};

use super::normalize_words;

type NodeId = usize;
type PatternId = usize;

const ROOT: NodeId = 0;

/// One automaton state
#[derive(Clone, Debug, Default)]
struct Node {
    /// Outgoing trie edges
    children: HashMap<char, NodeId>,
    /// Fallback state when no child edge matches
    fail: NodeId,
    /// Patterns ending at this state, including those inherited through `fail`
    outputs: Vec<PatternId>,
}

/// A pattern stored with its precomputed char length
#[derive(Clone, Debug)]
struct Entry {
    word: String,
    char_len: usize,
}

/// One occurrence reported by [`PatternAutomaton::search`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hit<'a> {
    /// The matched pattern
    pub word: &'a str,
    /// Char offset of the first matched char
    pub start: usize,
    /// Char offset one past the last matched char
    pub end: usize,
}

/// Searchable automaton over a set of words
#[derive(Clone, Debug)]
pub struct PatternAutomaton {
    nodes: Vec<Node>,
    patterns: Vec<Entry>,
}

impl Default for PatternAutomaton {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternAutomaton {
    /// Create an empty automaton (matches nothing)
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::default()],
            patterns: Vec::new(),
        }
    }

    /// Create an automaton from a word list
    pub fn from_patterns<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut automaton = Self::new();
        automaton.build(patterns);
        automaton
    }

    /// Rebuild from scratch with the given patterns
    ///
    /// Blank patterns are skipped and duplicates collapse. The new trie is
    /// assembled off to the side and swapped in at the end, so `self` is
    /// never observable half-built.
    pub fn build<I, S>(&mut self, patterns: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = normalize_words(patterns);

        let mut nodes = vec![Node::default()];
        let mut entries = Vec::with_capacity(words.len());

        for word in words {
            let id = entries.len();
            let mut state = ROOT;
            let mut char_len = 0;

            for ch in word.chars() {
                char_len += 1;
                state = match nodes[state].children.get(&ch) {
                    Some(&next) => next,
                    None => {
                        let next = nodes.len();
                        nodes.push(Node::default());
                        nodes[state].children.insert(ch, next);
                        next
                    }
                };
            }

            nodes[state].outputs.push(id);
            entries.push(Entry { word, char_len });
        }

        Self::link_failures(&mut nodes);

        self.nodes = nodes;
        self.patterns = entries;
    }

    /// Compute failure links breadth-first and fold inherited outputs in
    fn link_failures(nodes: &mut [Node]) {
        let mut queue: VecDeque<NodeId> = VecDeque::new();

        let depth_one: Vec<NodeId> = nodes[ROOT].children.values().copied().collect();
        for child in depth_one {
            nodes[child].fail = ROOT;
            queue.push_back(child);
        }

        while let Some(current) = queue.pop_front() {
            let edges: Vec<(char, NodeId)> = nodes[current]
                .children
                .iter()
                .map(|(&ch, &child)| (ch, child))
                .collect();

            for (ch, child) in edges {
                queue.push_back(child);

                let mut fallback = nodes[current].fail;
                let fail = loop {
                    if let Some(&target) = nodes[fallback].children.get(&ch) {
                        break target;
                    }
                    if fallback == ROOT {
                        break ROOT;
                    }
                    fallback = nodes[fallback].fail;
                };

                nodes[child].fail = fail;

                // `fail` is shallower, so BFS has already finalized its outputs
                let inherited = nodes[fail].outputs.clone();
                nodes[child].outputs.extend(inherited);
            }
        }
    }

    /// Report every occurrence of every pattern in `text`
    ///
    /// Hits are ordered by end position; hits sharing an end position are
    /// ordered longest first.
    pub fn search<'a>(&'a self, text: &str) -> Vec<Hit<'a>> {
        if self.patterns.is_empty() || text.is_empty() {
            return Vec::new();
        }

        let mut hits = Vec::new();
        let mut state = ROOT;

        for (pos, ch) in text.chars().enumerate() {
            state = self.step(state, ch);

            for &id in &self.nodes[state].outputs {
                let entry = &self.patterns[id];
                hits.push(Hit {
                    word: &entry.word,
                    start: pos + 1 - entry.char_len,
                    end: pos + 1,
                });
            }
        }

        hits
    }

    /// One transition: follow failure links until an edge for `ch` exists
    #[inline]
    fn step(&self, mut state: NodeId, ch: char) -> NodeId {
        loop {
            if let Some(&next) = self.nodes[state].children.get(&ch) {
                return next;
            }
            if state == ROOT {
                return ROOT;
            }
            state = self.nodes[state].fail;
        }
    }

    /// Number of distinct patterns
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Number of trie states, root included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// True when no patterns are loaded
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
