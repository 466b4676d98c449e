//! Highlight decorations
//!
//! One decoration per match, addressed in the surface's line/column space
//! and classed by severity. The set always replaces the previous one.

use log::warn;
use serde::Serialize;

use super::{Position, TextSurface};
use crate::matching::{Match, Severity};

/// One highlighted span
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Decoration {
    /// Inclusive start
    pub start: Position,
    /// Exclusive end
    pub end: Position,
    /// Severity of the underlying match
    pub severity: Severity,
    /// Style class for the surface
    pub class: &'static str,
}

/// Builds decoration sets from match lists
#[derive(Clone, Copy, Debug, Default)]
pub struct MarkerRenderer;

impl MarkerRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Convert matches into decorations
    ///
    /// Spans the surface cannot convert are logged and left out.
    pub fn render<S>(&self, matches: &[Match], surface: &S) -> Vec<Decoration>
    where
        S: TextSurface + ?Sized,
    {
        let mut decorations = Vec::with_capacity(matches.len());

        for m in matches {
            let start = surface.offset_to_position(m.start_index);
            let end = surface.offset_to_position(m.end_index);

            match (start, end) {
                (Some(start), Some(end)) => decorations.push(Decoration {
                    start,
                    end,
                    severity: m.severity,
                    class: m.severity.css_class(),
                }),
                _ => warn!(
                    "Surface cannot address span [{}, {}) for '{}', skipping highlight",
                    m.start_index, m.end_index, m.word
                ),
            }
        }

        decorations
    }
}
