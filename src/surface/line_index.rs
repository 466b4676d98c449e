//! Char offset to line/column conversion
//!
//! Hosts that address text by line and column can build a `LineIndex` from
//! the same text that was sent for detection and map match offsets with it.

use super::Position;

/// Char offsets of every line start in a text
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineIndex {
    /// Char offset where each line begins; always starts with 0
    line_starts: Vec<usize>,
    /// Total chars in the text
    len: usize,
}

impl LineIndex {
    /// Index the line starts of `text`
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        let mut len = 0;

        for ch in text.chars() {
            len += 1;
            if ch == '\n' {
                line_starts.push(len);
            }
        }

        Self { line_starts, len }
    }

    /// Convert a char offset; `None` past the end of the text
    ///
    /// `offset == len` is allowed so exclusive span ends convert too.
    pub fn position(&self, offset: usize) -> Option<Position> {
        if offset > self.len {
            return None;
        }

        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };

        Some(Position {
            line,
            column: offset - self.line_starts[line],
        })
    }

    /// Number of lines (an empty text has one)
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Total chars
    pub fn len(&self) -> usize {
        self.len
    }

    /// True for an empty text
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line() {
        let index = LineIndex::new("这是暴力内容");
        assert_eq!(index.line_count(), 1);
        assert_eq!(index.position(2), Some(Position { line: 0, column: 2 }));
        assert_eq!(index.position(6), Some(Position { line: 0, column: 6 }));
        assert_eq!(index.position(7), None);
    }

    #[test]
    fn test_multi_line() {
        let index = LineIndex::new("ab\ncd\n\nef");
        assert_eq!(index.line_count(), 4);
        assert_eq!(index.position(3), Some(Position { line: 1, column: 0 }));
        assert_eq!(index.position(5), Some(Position { line: 1, column: 2 }));
        assert_eq!(index.position(6), Some(Position { line: 2, column: 0 }));
        assert_eq!(index.position(8), Some(Position { line: 3, column: 1 }));
    }

    #[test]
    fn test_empty_text() {
        let index = LineIndex::new("");
        assert!(index.is_empty());
        assert_eq!(index.position(0), Some(Position { line: 0, column: 0 }));
    }
}
