//! In-memory text surface
//!
//! A plain `String`-backed surface for headless hosts and tests. It keeps the
//! last decoration set it was given.

use super::{Decoration, LineIndex, Position, TextSurface};

/// String-backed `TextSurface`
#[derive(Clone, Debug)]
pub struct MemorySurface {
    text: String,
    index: LineIndex,
    ready: bool,
    converts_positions: bool,
    hover_registered: bool,
    decorations: Vec<Decoration>,
    /// Number of times a decoration set was applied
    applied: usize,
}

impl MemorySurface {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            index: LineIndex::new(text),
            ready: true,
            converts_positions: true,
            hover_registered: false,
            decorations: Vec::new(),
            applied: 0,
        }
    }

    /// Start in the not-ready state
    pub fn not_ready(mut self) -> Self {
        self.ready = false;
        self
    }

    /// Simulate a surface lacking offset conversion
    pub fn without_position_conversion(mut self) -> Self {
        self.converts_positions = false;
        self
    }

    /// Replace the text (the caller reports the change to the controller)
    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.index = LineIndex::new(text);
    }

    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    /// Decorations currently applied
    pub fn decorations(&self) -> &[Decoration] {
        &self.decorations
    }

    /// How many decoration sets have been applied
    pub fn applied_count(&self) -> usize {
        self.applied
    }

    pub fn hover_registered(&self) -> bool {
        self.hover_registered
    }
}

impl TextSurface for MemorySurface {
    fn text(&self) -> String {
        self.text.clone()
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn offset_to_position(&self, offset: usize) -> Option<Position> {
        if !self.converts_positions {
            return None;
        }
        self.index.position(offset)
    }

    fn apply_decorations(&mut self, decorations: Vec<Decoration>) {
        self.decorations = decorations;
        self.applied += 1;
    }

    fn set_hover_provider(&mut self, registered: bool) {
        self.hover_registered = registered;
    }
}
