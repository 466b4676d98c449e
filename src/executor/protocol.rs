//! Executor message protocol
//!
//! Requests flow foreground -> executor, responses flow back. Only `detect`
//! produces a reply on success; dictionary edits reply only on failure.
//! Both enums serialize as `{"type": "...", ...}` with camelCase fields so a
//! host can relay them over its own IPC unchanged.

use serde::{Deserialize, Serialize};

use crate::matching::{Match, Severity};

/// Correlation id for detect requests
///
/// Monotonic per controller; only the most recently issued id is honored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub u64);

impl RequestId {
    /// The id following this one
    pub fn next(self) -> Self {
        RequestId(self.0 + 1)
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Message sent to the executor
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ExecutorRequest {
    /// Scan `text` against the current dictionary
    #[serde(rename_all = "camelCase")]
    Detect { text: String, request_id: RequestId },
    /// Replace the dictionary
    LoadDictionary { words: Vec<String> },
    /// Add words to the dictionary
    AddWords { words: Vec<String> },
    /// Remove words from the dictionary
    RemoveWords { words: Vec<String> },
    /// Override the severity of an active word
    SetSeverity { word: String, severity: Severity },
}

impl ExecutorRequest {
    /// Short name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            ExecutorRequest::Detect { .. } => "detect",
            ExecutorRequest::LoadDictionary { .. } => "loadDictionary",
            ExecutorRequest::AddWords { .. } => "addWords",
            ExecutorRequest::RemoveWords { .. } => "removeWords",
            ExecutorRequest::SetSeverity { .. } => "setSeverity",
        }
    }

    /// Correlation id, only present on detect
    pub fn request_id(&self) -> Option<RequestId> {
        match self {
            ExecutorRequest::Detect { request_id, .. } => Some(*request_id),
            _ => None,
        }
    }
}

/// Message sent back from the executor
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ExecutorResponse {
    /// Result of a detect
    #[serde(rename_all = "camelCase")]
    DetectResult {
        matches: Vec<Match>,
        request_id: RequestId,
    },
    /// Failure while handling a request
    #[serde(rename_all = "camelCase")]
    Error {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        request_id: Option<RequestId>,
    },
}

impl ExecutorResponse {
    /// Correlation id, absent for dictionary edit failures
    pub fn request_id(&self) -> Option<RequestId> {
        match self {
            ExecutorResponse::DetectResult { request_id, .. } => Some(*request_id),
            ExecutorResponse::Error { request_id, .. } => *request_id,
        }
    }

    /// Check if this is an error reply
    pub fn is_error(&self) -> bool {
        matches!(self, ExecutorResponse::Error { .. })
    }
}
