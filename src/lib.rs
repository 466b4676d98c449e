//! Content Guard: sensitive word screening for editor text surfaces
//!
//! Scans the text of an editing surface against a dictionary of sensitive
//! words and keeps a set of severity-classed highlights in sync with it.
//!
//! - `matching`: Aho-Corasick automaton and the dictionary that feeds it
//! - `executor`: dedicated thread owning the dictionary, driven by messages
//! - `controller`: debounced, stale-response-discarding foreground coordinator
//! - `surface`: host editor trait, highlight decorations, hover content
//!
//! The subsystem does no file or network I/O; the host supplies text,
//! configuration and a logger backend for the `log` facade.

pub mod config;
pub mod controller;
pub mod executor;
pub mod matching;
pub mod surface;
pub mod telemetry;

pub use config::{ConfigError, Locale, ScreeningConfig};
pub use controller::{Phase, ScreeningController};
pub use executor::{ExecutorError, ExecutorHandle, ExecutorRequest, ExecutorResponse, RequestId, ScreeningExecutor};
pub use matching::{DictionaryStore, Match, PatternAutomaton, Severity};
pub use surface::{Decoration, HoverContent, MemorySurface, Position, SurfaceEvent, TextSurface};
