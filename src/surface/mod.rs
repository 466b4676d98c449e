//! Text surface integration
//!
//! This module provides:
//! - The `TextSurface` trait the host editor implements
//! - Highlight decorations built from match spans
//! - Hover resolution over the current match list
//! - Char offset to line/column conversion

pub mod hover;
pub mod line_index;
pub mod markers;
pub mod memory;

pub use hover::{HoverContent, HoverResolver};
pub use line_index::LineIndex;
pub use markers::{Decoration, MarkerRenderer};
pub use memory::MemorySurface;

use serde::Serialize;

use crate::matching::Severity;

/// Zero-based line/column; column counts chars
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

/// Editor surface the controller screens
///
/// Implemented by the host. All methods are called from the foreground.
pub trait TextSurface {
    /// Current full text
    fn text(&self) -> String;

    /// Whether the surface can be screened yet
    fn is_ready(&self) -> bool {
        true
    }

    /// Map a char offset to the surface's native addressing
    ///
    /// `None` means the surface cannot convert it; the span is skipped.
    fn offset_to_position(&self, offset: usize) -> Option<Position>;

    /// Replace the whole decoration set
    fn apply_decorations(&mut self, decorations: Vec<Decoration>);

    /// Register or unregister the hover provider
    ///
    /// When registered, the host forwards hover queries to
    /// `ScreeningController::hover`.
    fn set_hover_provider(&mut self, _registered: bool) {}
}

/// Inputs the driver loop reacts to
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// The text was edited
    TextChanged,
    /// The feature was switched on or off
    SetEnabled(bool),
    /// Hot-reload the dictionary
    LoadDictionary(Vec<String>),
    /// Add words to the dictionary
    AddWords(Vec<String>),
    /// Remove words from the dictionary
    RemoveWords(Vec<String>),
    /// Override one word's severity
    SetSeverity { word: String, severity: Severity },
    /// The surface is going away
    Detach,
}
