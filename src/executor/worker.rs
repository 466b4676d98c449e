//! Screening Executor
//!
//! A dedicated OS thread owning the dictionary and automaton. It is reached
//! only through channels: requests are handled one at a time in arrival
//! order, so a detect never overlaps a dictionary edit and always sees the
//! dictionary as of the moment it runs.
//!
//! Nothing thrown inside a handler crosses the channel. Errors and panics
//! both come back as `ExecutorResponse::Error`.

use std::panic::{self, AssertUnwindSafe};
use std::thread;

use log::{debug, info, warn};
use thiserror::Error;
use tokio::sync::mpsc;

use super::protocol::{ExecutorRequest, ExecutorResponse, RequestId};
use crate::config::ScreeningConfig;
use crate::matching::{DictionaryStore, Severity};
use crate::telemetry;

/// Failures inside or around the executor
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExecutorError {
    /// Detect refused for oversized text
    #[error("text of {chars} chars exceeds the {limit} char scan limit")]
    TextTooLarge { chars: usize, limit: usize },
    /// A handler panicked
    #[error("executor panicked: {0}")]
    Panicked(String),
    /// The executor thread is gone
    #[error("executor is no longer running")]
    Disconnected,
    /// The executor thread could not be started
    #[error("failed to spawn executor thread: {0}")]
    Spawn(String),
}

/// Background computation context for screening
pub struct ScreeningExecutor {
    store: DictionaryStore,
    max_text_chars: usize,
    log_matches: bool,
    /// Detects of exactly this text panic
    #[cfg(test)]
    panic_on: Option<String>,
}

impl ScreeningExecutor {
    /// Create an executor around an existing store
    pub fn new(store: DictionaryStore, max_text_chars: usize) -> Self {
        Self {
            store,
            max_text_chars,
            log_matches: false,
            #[cfg(test)]
            panic_on: None,
        }
    }

    /// Create an executor with the configured dictionary and overrides
    pub fn from_config(config: &ScreeningConfig) -> Self {
        let mut store = DictionaryStore::with_words(&config.dictionary);
        for (word, severity) in &config.severity_overrides {
            store.set_severity(word, *severity);
        }

        Self {
            store,
            max_text_chars: config.max_text_chars,
            log_matches: config.log_matches,
            #[cfg(test)]
            panic_on: None,
        }
    }

    /// Read access to the dictionary (for inspection before spawning)
    pub fn store(&self) -> &DictionaryStore {
        &self.store
    }

    /// Handle one request, converting failures into an error reply
    pub fn handle(&mut self, request: ExecutorRequest) -> Option<ExecutorResponse> {
        let request_id = request.request_id();
        let kind = request.kind();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.process(request)))
            .unwrap_or_else(|payload| Err(ExecutorError::Panicked(panic_message(payload))));

        match outcome {
            Ok(response) => response,
            Err(e) => {
                let message = e.to_string();
                debug!("{} request failed: {}", kind, message);
                Some(ExecutorResponse::Error {
                    message,
                    request_id,
                })
            }
        }
    }

    fn process(&mut self, request: ExecutorRequest) -> Result<Option<ExecutorResponse>, ExecutorError> {
        match request {
            ExecutorRequest::Detect { text, request_id } => {
                self.detect(&text, request_id).map(Some)
            }
            ExecutorRequest::LoadDictionary { words } => {
                self.store.load(&words);
                telemetry::audit_dictionary_loaded(self.store.len()).emit();
                Ok(None)
            }
            ExecutorRequest::AddWords { words } => {
                if self.store.add_words(&words) {
                    telemetry::audit_dictionary_edited("add_words", self.store.len()).emit();
                }
                Ok(None)
            }
            ExecutorRequest::RemoveWords { words } => {
                if self.store.remove_words(&words) {
                    telemetry::audit_dictionary_edited("remove_words", self.store.len()).emit();
                }
                Ok(None)
            }
            ExecutorRequest::SetSeverity { word, severity } => {
                self.set_severity(&word, severity);
                Ok(None)
            }
        }
    }

    fn detect(&self, text: &str, request_id: RequestId) -> Result<ExecutorResponse, ExecutorError> {
        let chars = text.chars().count();
        if chars > self.max_text_chars {
            return Err(ExecutorError::TextTooLarge {
                chars,
                limit: self.max_text_chars,
            });
        }

        #[cfg(test)]
        if self.panic_on.as_deref() == Some(text) {
            panic!("scan failed on request {}", request_id);
        }

        let matches = self.store.detect(text);

        let mut event = telemetry::audit_detect(request_id, matches.len());
        if self.log_matches && !matches.is_empty() {
            event = event.with_matched_words(matches.iter().map(|m| m.word.clone()).collect());
        }
        event.emit();

        Ok(ExecutorResponse::DetectResult {
            matches,
            request_id,
        })
    }

    fn set_severity(&mut self, word: &str, severity: Severity) {
        if self.store.set_severity(word, severity) {
            telemetry::audit_dictionary_edited("set_severity", self.store.len()).emit();
        }
    }

    /// Move the executor onto its own thread
    ///
    /// Returns the request handle and the response stream. The thread exits
    /// once every handle has been dropped.
    pub fn spawn(
        self,
    ) -> Result<(ExecutorHandle, mpsc::UnboundedReceiver<ExecutorResponse>), ExecutorError> {
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let (response_tx, response_rx) = mpsc::unbounded_channel();

        thread::Builder::new()
            .name("screening-executor".to_string())
            .spawn(move || self.run(request_rx, response_tx))
            .map_err(|e| ExecutorError::Spawn(e.to_string()))?;

        Ok((ExecutorHandle { tx: request_tx }, response_rx))
    }

    fn run(
        mut self,
        mut requests: mpsc::UnboundedReceiver<ExecutorRequest>,
        responses: mpsc::UnboundedSender<ExecutorResponse>,
    ) {
        info!(
            "Screening executor started with {} words",
            self.store.len()
        );

        while let Some(request) = requests.blocking_recv() {
            if let Some(response) = self.handle(request) {
                if responses.send(response).is_err() {
                    debug!("Response receiver dropped, reply discarded");
                }
            }
        }

        info!("Screening executor stopped");
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Sending side of the executor channel
#[derive(Clone, Debug)]
pub struct ExecutorHandle {
    tx: mpsc::UnboundedSender<ExecutorRequest>,
}

impl ExecutorHandle {
    /// Wrap a bare sender so tests can observe outgoing requests
    #[cfg(test)]
    pub(crate) fn from_sender(tx: mpsc::UnboundedSender<ExecutorRequest>) -> Self {
        Self { tx }
    }

    /// Queue a request; never blocks
    pub fn send(&self, request: ExecutorRequest) -> Result<(), ExecutorError> {
        self.tx.send(request).map_err(|e| {
            warn!("Executor unavailable, dropping {} request", e.0.kind());
            ExecutorError::Disconnected
        })
    }

    /// Queue a detect
    pub fn detect(&self, text: String, request_id: RequestId) -> Result<(), ExecutorError> {
        self.send(ExecutorRequest::Detect { text, request_id })
    }

    /// Queue a dictionary replacement
    pub fn load_dictionary(&self, words: Vec<String>) -> Result<(), ExecutorError> {
        self.send(ExecutorRequest::LoadDictionary { words })
    }

    /// Queue a word addition
    pub fn add_words(&self, words: Vec<String>) -> Result<(), ExecutorError> {
        self.send(ExecutorRequest::AddWords { words })
    }

    /// Queue a word removal
    pub fn remove_words(&self, words: Vec<String>) -> Result<(), ExecutorError> {
        self.send(ExecutorRequest::RemoveWords { words })
    }

    /// Queue a severity override
    pub fn set_severity(&self, word: String, severity: Severity) -> Result<(), ExecutorError> {
        self.send(ExecutorRequest::SetSeverity { word, severity })
    }

    /// Release this handle
    ///
    /// The executor stops once the last clone is shut down or dropped.
    pub fn shutdown(self) {
        info!("Screening executor handle shut down");
        drop(self.tx);
    }
}
