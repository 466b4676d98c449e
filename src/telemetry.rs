//! Telemetry Module for content screening
//!
//! Emits structured, single-line JSON audit records through the `log`
//! facade. The host decides where they go.

use log::{debug, info, warn};
use serde::Serialize;

use crate::executor::RequestId;

const AUDIT_PREFIX: &str = "[CONTENT-GUARD-AUDIT]";

/// Audit event types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreeningEventType {
    /// Dictionary replaced
    DictionaryLoaded,
    /// Words added, removed, or re-weighted
    DictionaryEdited,
    /// Detect finished inside the executor
    DetectCompleted,
    /// Stale or post-detach response dropped by the controller
    ResponseDiscarded,
    /// Executor reported an error for a request
    ExecutorFailure,
    /// Controller detached or disabled
    ControllerDetached,
}

/// Audit event for logging
#[derive(Debug, Clone, Serialize)]
pub struct ScreeningEvent {
    /// Event type
    pub event_type: ScreeningEventType,
    /// Correlated detect request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<RequestId>,
    /// Dictionary size after the event
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_count: Option<usize>,
    /// Number of matches produced
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_count: Option<usize>,
    /// Reason for the event
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Matched words (only when `log_matches` is on)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_words: Option<Vec<String>>,
}

impl ScreeningEvent {
    /// Create a new audit event
    pub fn new(event_type: ScreeningEventType) -> Self {
        Self {
            event_type,
            request_id: None,
            word_count: None,
            match_count: None,
            reason: None,
            matched_words: None,
        }
    }

    /// Set request ID
    pub fn with_request_id(mut self, id: RequestId) -> Self {
        self.request_id = Some(id);
        self
    }

    /// Set dictionary size
    pub fn with_word_count(mut self, count: usize) -> Self {
        self.word_count = Some(count);
        self
    }

    /// Set match count
    pub fn with_match_count(mut self, count: usize) -> Self {
        self.match_count = Some(count);
        self
    }

    /// Set reason
    pub fn with_reason(mut self, reason: &str) -> Self {
        self.reason = Some(reason.to_string());
        self
    }

    /// Set matched words
    pub fn with_matched_words(mut self, words: Vec<String>) -> Self {
        self.matched_words = Some(words);
        self
    }

    /// Log the event
    pub fn emit(&self) {
        match serde_json::to_string(self) {
            Ok(json) => match self.event_type {
                ScreeningEventType::ExecutorFailure => warn!("{} {}", AUDIT_PREFIX, json),
                ScreeningEventType::ResponseDiscarded | ScreeningEventType::DetectCompleted => {
                    debug!("{} {}", AUDIT_PREFIX, json)
                }
                _ => info!("{} {}", AUDIT_PREFIX, json),
            },
            Err(e) => {
                warn!("Failed to serialize audit event: {}", e);
            }
        }
    }
}

/// Create a dictionary loaded audit event
pub fn audit_dictionary_loaded(word_count: usize) -> ScreeningEvent {
    ScreeningEvent::new(ScreeningEventType::DictionaryLoaded).with_word_count(word_count)
}

/// Create a dictionary edited audit event
pub fn audit_dictionary_edited(action: &str, word_count: usize) -> ScreeningEvent {
    ScreeningEvent::new(ScreeningEventType::DictionaryEdited)
        .with_reason(action)
        .with_word_count(word_count)
}

/// Create a detect completed audit event
pub fn audit_detect(request_id: RequestId, match_count: usize) -> ScreeningEvent {
    ScreeningEvent::new(ScreeningEventType::DetectCompleted)
        .with_request_id(request_id)
        .with_match_count(match_count)
}

/// Create a discarded response audit event
pub fn audit_discarded(request_id: Option<RequestId>, reason: &str) -> ScreeningEvent {
    let event = ScreeningEvent::new(ScreeningEventType::ResponseDiscarded).with_reason(reason);
    match request_id {
        Some(id) => event.with_request_id(id),
        None => event,
    }
}

/// Create an executor failure audit event
pub fn audit_failure(request_id: Option<RequestId>, message: &str) -> ScreeningEvent {
    let event = ScreeningEvent::new(ScreeningEventType::ExecutorFailure).with_reason(message);
    match request_id {
        Some(id) => event.with_request_id(id),
        None => event,
    }
}

/// Create a controller detached audit event
pub fn audit_detached(reason: &str) -> ScreeningEvent {
    ScreeningEvent::new(ScreeningEventType::ControllerDetached).with_reason(reason)
}
