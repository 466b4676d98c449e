//! Screening Controller
//!
//! Foreground coordinator between a text surface and the executor.
//!
//! - Text changes restart a debounce timer; when it fires a detect is issued
//! - Every detect carries a fresh `RequestId`; only a response for the most
//!   recently issued id is applied, anything older is dropped
//! - Disabling or detaching clears highlights at once and makes every later
//!   response a no-op
//!
//! Stale-response discarding is the only cancellation there is: a scan that
//! has started inside the executor always runs to completion.

pub mod debounce;
pub mod driver;

pub use debounce::Debouncer;
pub use driver::run;

use log::{debug, warn};
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::config::ScreeningConfig;
use crate::executor::{ExecutorError, ExecutorHandle, ExecutorResponse, RequestId, ScreeningExecutor};
use crate::matching::{Match, Severity};
use crate::surface::{HoverContent, HoverResolver, MarkerRenderer, SurfaceEvent, TextSurface};
use crate::telemetry;

/// Whether a detect cycle is outstanding
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Detecting,
}

/// Coordinates screening for one text surface
pub struct ScreeningController<S: TextSurface> {
    surface: S,
    /// `None` after detach
    executor: Option<ExecutorHandle>,
    debouncer: Debouncer,
    renderer: MarkerRenderer,
    hover: HoverResolver,
    enabled: bool,
    /// Screening the surface right now (enabled, ready, not detached)
    active: bool,
    phase: Phase,
    /// Most recently issued detect id; the only one honored
    latest: Option<RequestId>,
    next_id: RequestId,
    matches: Vec<Match>,
}

impl<S: TextSurface> ScreeningController<S> {
    /// Create a controller over an already running executor
    ///
    /// Nothing is screened until [`attach`](Self::attach).
    pub fn with_executor(config: &ScreeningConfig, surface: S, executor: ExecutorHandle) -> Self {
        Self {
            surface,
            executor: Some(executor),
            debouncer: Debouncer::new(config.debounce()),
            renderer: MarkerRenderer::new(),
            hover: HoverResolver::new(config.locale),
            enabled: config.enabled,
            active: false,
            phase: Phase::Idle,
            latest: None,
            next_id: RequestId::default(),
            matches: Vec::new(),
        }
    }

    /// Start an executor from `config` and attach to `surface`
    ///
    /// Returns the executor response stream to feed into
    /// [`on_response`](Self::on_response) (or hand to [`run`]).
    pub fn spawn(
        config: &ScreeningConfig,
        surface: S,
    ) -> Result<(Self, mpsc::UnboundedReceiver<ExecutorResponse>), ExecutorError> {
        let (handle, responses) = ScreeningExecutor::from_config(config).spawn()?;
        let mut controller = Self::with_executor(config, surface, handle);
        controller.attach();
        Ok((controller, responses))
    }

    /// Begin screening if enabled and the surface is ready; issues a detect
    pub fn attach(&mut self) {
        if self.active || !self.enabled || self.executor.is_none() {
            return;
        }
        if !self.surface.is_ready() {
            debug!("Text surface not ready, deferring attach");
            return;
        }

        self.active = true;
        self.surface.set_hover_provider(true);
        self.issue_detect();
    }

    /// React to an edit of the surface text
    pub fn on_text_changed(&mut self, now: Instant) {
        if !self.enabled || self.executor.is_none() {
            return;
        }
        if !self.active {
            // Surface may have become ready since the last attempt
            self.attach();
            return;
        }
        self.debouncer.schedule(now);
    }

    /// Pending debounce deadline, if any
    pub fn debounce_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Issue a detect if the debounce deadline has passed
    pub fn poll_debounce(&mut self, now: Instant) -> bool {
        if !self.active || !self.debouncer.fire(now) {
            return false;
        }
        self.issue_detect()
    }

    fn issue_detect(&mut self) -> bool {
        let Some(executor) = &self.executor else {
            return false;
        };

        let request_id = self.next_id.next();
        self.next_id = request_id;

        match executor.detect(self.surface.text(), request_id) {
            Ok(()) => {
                self.latest = Some(request_id);
                self.phase = Phase::Detecting;
                true
            }
            Err(e) => {
                warn!("Detect {} not issued: {}", request_id, e);
                self.phase = Phase::Idle;
                false
            }
        }
    }

    /// Apply or discard a response from the executor
    pub fn on_response(&mut self, response: ExecutorResponse) {
        if !self.active {
            telemetry::audit_discarded(response.request_id(), "controller inactive").emit();
            return;
        }

        match response {
            ExecutorResponse::DetectResult {
                matches,
                request_id,
            } => {
                if self.is_current(request_id) {
                    self.apply(matches);
                    self.phase = Phase::Idle;
                } else {
                    telemetry::audit_discarded(Some(request_id), "stale response").emit();
                }
            }
            ExecutorResponse::Error {
                message,
                request_id,
            } => {
                // Scoped to its request; existing highlights stay
                telemetry::audit_failure(request_id, &message).emit();
                if let Some(id) = request_id {
                    if self.is_current(id) {
                        self.phase = Phase::Idle;
                    }
                }
            }
        }
    }

    fn is_current(&self, request_id: RequestId) -> bool {
        self.phase == Phase::Detecting && self.latest == Some(request_id)
    }

    fn apply(&mut self, matches: Vec<Match>) {
        self.matches = matches;
        let decorations = self.renderer.render(&self.matches, &self.surface);
        self.surface.apply_decorations(decorations);
    }

    /// Switch screening on or off
    ///
    /// Turning it off clears highlights and the count immediately.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;

        if enabled {
            self.attach();
        } else {
            self.deactivate("disabled");
        }
    }

    /// Stop screening for good and release the executor
    pub fn detach(&mut self) {
        self.deactivate("detached");
        self.executor = None;
    }

    /// Returns whether screening was actually running
    fn deactivate(&mut self, reason: &str) -> bool {
        self.debouncer.cancel();
        self.phase = Phase::Idle;

        if !self.active {
            return false;
        }

        self.active = false;
        self.matches.clear();
        self.surface.apply_decorations(Vec::new());
        self.surface.set_hover_provider(false);
        telemetry::audit_detached(reason).emit();
        true
    }

    /// Hot-reload the dictionary, then refresh highlights
    pub fn load_dictionary(&mut self, words: Vec<String>) -> Result<(), ExecutorError> {
        self.executor()?.load_dictionary(words)?;
        self.refresh();
        Ok(())
    }

    /// Add words, then refresh highlights
    pub fn add_words(&mut self, words: Vec<String>) -> Result<(), ExecutorError> {
        self.executor()?.add_words(words)?;
        self.refresh();
        Ok(())
    }

    /// Remove words, then refresh highlights
    pub fn remove_words(&mut self, words: Vec<String>) -> Result<(), ExecutorError> {
        self.executor()?.remove_words(words)?;
        self.refresh();
        Ok(())
    }

    /// Override a word's severity, then refresh highlights
    pub fn set_severity(&mut self, word: String, severity: Severity) -> Result<(), ExecutorError> {
        self.executor()?.set_severity(word, severity)?;
        self.refresh();
        Ok(())
    }

    fn executor(&self) -> Result<&ExecutorHandle, ExecutorError> {
        self.executor.as_ref().ok_or(ExecutorError::Disconnected)
    }

    /// Detect right away, superseding any pending debounce
    fn refresh(&mut self) {
        if self.active {
            self.debouncer.cancel();
            self.issue_detect();
        }
    }

    /// Dispatch one surface event; returns false on `Detach`
    pub fn handle_event(&mut self, event: SurfaceEvent, now: Instant) -> bool {
        let result = match event {
            SurfaceEvent::TextChanged => {
                self.on_text_changed(now);
                Ok(())
            }
            SurfaceEvent::SetEnabled(enabled) => {
                self.set_enabled(enabled);
                Ok(())
            }
            SurfaceEvent::LoadDictionary(words) => self.load_dictionary(words),
            SurfaceEvent::AddWords(words) => self.add_words(words),
            SurfaceEvent::RemoveWords(words) => self.remove_words(words),
            SurfaceEvent::SetSeverity { word, severity } => self.set_severity(word, severity),
            SurfaceEvent::Detach => {
                self.detach();
                return false;
            }
        };

        if let Err(e) = result {
            warn!("Dictionary edit not delivered: {}", e);
        }
        true
    }

    /// Resolve a hover at a char offset against the current matches
    pub fn hover(&self, offset: usize) -> Option<HoverContent> {
        if !self.active {
            return None;
        }
        self.hover.resolve(&self.matches, offset)
    }

    /// Number of matches currently highlighted
    pub fn sensitive_word_count(&self) -> usize {
        self.matches.len()
    }

    /// True while a detect is outstanding
    pub fn is_detecting(&self) -> bool {
        self.phase == Phase::Detecting
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Give the surface back
    pub fn into_surface(self) -> S {
        self.surface
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::ExecutorRequest;
    use crate::surface::MemorySurface;
    use std::time::Duration;

    const DEBOUNCE: Duration = Duration::from_millis(500);

    struct Harness {
        controller: ScreeningController<MemorySurface>,
        requests: mpsc::UnboundedReceiver<ExecutorRequest>,
    }

    impl Harness {
        fn new(text: &str) -> Self {
            Self::with_surface(MemorySurface::new(text))
        }

        fn with_surface(surface: MemorySurface) -> Self {
            let (tx, requests) = mpsc::unbounded_channel();
            let config = ScreeningConfig::default();
            let controller =
                ScreeningController::with_executor(&config, surface, ExecutorHandle::from_sender(tx));
            Self {
                controller,
                requests,
            }
        }

        /// Next queued request, if any
        fn next_request(&mut self) -> Option<ExecutorRequest> {
            self.requests.try_recv().ok()
        }

        fn next_detect_id(&mut self) -> RequestId {
            match self.next_request() {
                Some(ExecutorRequest::Detect { request_id, .. }) => request_id,
                other => panic!("Expected detect request, got {:?}", other),
            }
        }
    }

    fn m(word: &str, start: usize, end: usize) -> Match {
        Match {
            word: word.to_string(),
            start_index: start,
            end_index: end,
            severity: Severity::for_word(word),
        }
    }

    fn result(request_id: RequestId, matches: Vec<Match>) -> ExecutorResponse {
        ExecutorResponse::DetectResult {
            matches,
            request_id,
        }
    }

    #[test]
    fn test_attach_issues_initial_detect() {
        let mut h = Harness::new("这是暴力内容");
        h.controller.attach();

        assert!(h.controller.is_active());
        assert!(h.controller.is_detecting());
        assert!(h.controller.surface().hover_registered());
        match h.next_request() {
            Some(ExecutorRequest::Detect { text, request_id }) => {
                assert_eq!(text, "这是暴力内容");
                assert_eq!(request_id, RequestId(1));
            }
            other => panic!("Expected detect request, got {:?}", other),
        }
    }

    #[test]
    fn test_attach_requires_enabled_and_ready() {
        let mut h = Harness::with_surface(MemorySurface::new("text").not_ready());
        h.controller.attach();
        assert!(!h.controller.is_active());
        assert!(h.next_request().is_none());

        // Becoming ready + an edit attaches
        h.controller.surface_mut().set_ready(true);
        h.controller.on_text_changed(Instant::now());
        assert!(h.controller.is_active());
        assert_eq!(h.next_detect_id(), RequestId(1));

        let (tx, _rx) = mpsc::unbounded_channel();
        let config = ScreeningConfig {
            enabled: false,
            ..Default::default()
        };
        let mut disabled = ScreeningController::with_executor(
            &config,
            MemorySurface::new("text"),
            ExecutorHandle::from_sender(tx),
        );
        disabled.attach();
        assert!(!disabled.is_active());
    }

    #[test]
    fn test_current_response_applied() {
        let mut h = Harness::new("这是暴力内容");
        h.controller.attach();
        let id = h.next_detect_id();

        h.controller.on_response(result(id, vec![m("暴力", 2, 4)]));

        assert!(!h.controller.is_detecting());
        assert_eq!(h.controller.sensitive_word_count(), 1);
        assert_eq!(h.controller.surface().decorations().len(), 1);
        assert_eq!(h.controller.surface().decorations()[0].class, "sensitive-word-low");
    }

    #[test]
    fn test_text_change_debounced() {
        let mut h = Harness::new("abc");
        h.controller.attach();
        let _ = h.next_detect_id();

        let t0 = Instant::now();
        h.controller.on_text_changed(t0);
        h.controller.on_text_changed(t0 + Duration::from_millis(200));
        h.controller.on_text_changed(t0 + Duration::from_millis(400));

        assert!(!h.controller.poll_debounce(t0 + Duration::from_millis(800)));
        assert!(h.next_request().is_none());

        assert!(h.controller.poll_debounce(t0 + Duration::from_millis(400) + DEBOUNCE));
        assert_eq!(h.next_detect_id(), RequestId(2));
        assert!(h.next_request().is_none());
        assert!(h.controller.debounce_deadline().is_none());
    }

    #[test]
    fn test_stale_response_discarded() {
        let mut h = Harness::new("abab");
        h.controller.attach();
        let r1 = h.next_detect_id();

        let t0 = Instant::now();
        h.controller.on_text_changed(t0);
        h.controller.poll_debounce(t0 + DEBOUNCE);
        let r2 = h.next_detect_id();
        assert!(r2 > r1);

        // r2 returns first, then the slow r1
        h.controller.on_response(result(r2, vec![m("b", 1, 2)]));
        h.controller.on_response(result(r1, vec![m("ab", 0, 2), m("ab", 2, 4)]));

        assert_eq!(h.controller.matches(), &[m("b", 1, 2)]);
        assert_eq!(h.controller.sensitive_word_count(), 1);
        assert_eq!(h.controller.surface().applied_count(), 1);
    }

    #[test]
    fn test_older_response_while_newer_in_flight() {
        let mut h = Harness::new("abab");
        h.controller.attach();
        let r1 = h.next_detect_id();

        let t0 = Instant::now();
        h.controller.on_text_changed(t0);
        h.controller.poll_debounce(t0 + DEBOUNCE);
        let r2 = h.next_detect_id();

        h.controller.on_response(result(r1, vec![m("ab", 0, 2)]));
        assert!(h.controller.is_detecting());
        assert_eq!(h.controller.sensitive_word_count(), 0);

        h.controller.on_response(result(r2, Vec::new()));
        assert!(!h.controller.is_detecting());
    }

    #[test]
    fn test_error_clears_in_flight_and_keeps_highlights() {
        let mut h = Harness::new("ab");
        h.controller.attach();
        let r1 = h.next_detect_id();
        h.controller.on_response(result(r1, vec![m("ab", 0, 2)]));

        let t0 = Instant::now();
        h.controller.on_text_changed(t0);
        h.controller.poll_debounce(t0 + DEBOUNCE);
        let r2 = h.next_detect_id();

        h.controller.on_response(ExecutorResponse::Error {
            message: "boom".to_string(),
            request_id: Some(r2),
        });

        assert!(!h.controller.is_detecting());
        assert_eq!(h.controller.sensitive_word_count(), 1);
        assert_eq!(h.controller.surface().decorations().len(), 1);
    }

    #[test]
    fn test_dictionary_error_does_not_touch_cycle() {
        let mut h = Harness::new("ab");
        h.controller.attach();
        let _ = h.next_detect_id();

        h.controller.on_response(ExecutorResponse::Error {
            message: "edit failed".to_string(),
            request_id: None,
        });
        assert!(h.controller.is_detecting());
    }

    #[test]
    fn test_disable_mid_cycle() {
        let mut h = Harness::new("ab");
        h.controller.attach();
        let r1 = h.next_detect_id();
        h.controller.on_response(result(r1, vec![m("ab", 0, 2)]));

        let t0 = Instant::now();
        h.controller.on_text_changed(t0);
        h.controller.poll_debounce(t0 + DEBOUNCE);
        let r2 = h.next_detect_id();
        h.controller.on_text_changed(t0 + DEBOUNCE);

        h.controller.set_enabled(false);
        assert_eq!(h.controller.sensitive_word_count(), 0);
        assert!(h.controller.surface().decorations().is_empty());
        assert!(!h.controller.is_detecting());
        assert!(h.controller.debounce_deadline().is_none());
        assert!(!h.controller.surface().hover_registered());

        // Late response for the outstanding request
        h.controller.on_response(result(r2, vec![m("ab", 0, 2)]));
        assert_eq!(h.controller.sensitive_word_count(), 0);
        assert!(h.controller.surface().decorations().is_empty());
        assert!(h.controller.hover(0).is_none());
    }

    #[test]
    fn test_reenable_ignores_pre_disable_response() {
        let mut h = Harness::new("ab");
        h.controller.attach();
        let r1 = h.next_detect_id();

        h.controller.set_enabled(false);
        h.controller.set_enabled(true);
        let r2 = h.next_detect_id();
        assert!(r2 > r1);

        h.controller.on_response(result(r1, vec![m("ab", 0, 2)]));
        assert_eq!(h.controller.sensitive_word_count(), 0);
        assert!(h.controller.is_detecting());

        h.controller.on_response(result(r2, vec![m("ab", 0, 2)]));
        assert_eq!(h.controller.sensitive_word_count(), 1);
    }

    #[test]
    fn test_deactivate_without_attach_is_silent() {
        let mut h = Harness::with_surface(MemorySurface::new("text").not_ready());
        h.controller.attach();

        assert!(!h.controller.deactivate("disabled"));
        h.controller.set_enabled(false);
        assert_eq!(h.controller.surface().applied_count(), 0);

        h.controller.set_enabled(true);
        h.controller.surface_mut().set_ready(true);
        h.controller.attach();
        assert!(h.controller.is_active());
        assert!(h.controller.deactivate("detached"));
        assert!(!h.controller.deactivate("detached"));
        assert_eq!(h.controller.surface().applied_count(), 1);
    }

    #[test]
    fn test_detach_releases_executor() {
        let mut h = Harness::new("ab");
        h.controller.attach();
        let r1 = h.next_detect_id();

        assert!(!h.controller.handle_event(SurfaceEvent::Detach, Instant::now()));
        h.controller.on_response(result(r1, vec![m("ab", 0, 2)]));
        assert_eq!(h.controller.sensitive_word_count(), 0);

        assert_eq!(
            h.controller.load_dictionary(vec!["x".to_string()]),
            Err(ExecutorError::Disconnected)
        );
        // Handle dropped, so the request channel is closed
        assert!(matches!(
            h.requests.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        ));
    }

    #[test]
    fn test_dictionary_edit_refreshes() {
        let mut h = Harness::new("ab");
        h.controller.attach();
        let _ = h.next_detect_id();

        h.controller.on_text_changed(Instant::now());
        h.controller
            .load_dictionary(vec!["ab".to_string()])
            .unwrap();

        assert_eq!(
            h.next_request(),
            Some(ExecutorRequest::LoadDictionary {
                words: vec!["ab".to_string()]
            })
        );
        assert_eq!(h.next_detect_id(), RequestId(2));
        // Refresh supersedes the pending debounce
        assert!(h.controller.debounce_deadline().is_none());

        h.controller
            .set_severity("ab".to_string(), Severity::High)
            .unwrap();
        assert!(matches!(
            h.next_request(),
            Some(ExecutorRequest::SetSeverity { .. })
        ));
        assert_eq!(h.next_detect_id(), RequestId(3));
    }

    #[test]
    fn test_dictionary_edit_while_inactive_skips_detect() {
        let mut h = Harness::new("ab");
        h.controller
            .add_words(vec!["ab".to_string()])
            .unwrap();
        assert!(matches!(
            h.next_request(),
            Some(ExecutorRequest::AddWords { .. })
        ));
        assert!(h.next_request().is_none());
    }

    #[test]
    fn test_hover_after_apply() {
        let mut h = Harness::new("xaby");
        h.controller.attach();
        let id = h.next_detect_id();
        h.controller
            .on_response(result(id, vec![m("ab", 1, 3), m("b", 2, 3)]));

        let hover = h.controller.hover(2).unwrap();
        assert_eq!(hover.word, "ab");
        assert_eq!(hover.severity_label, "低");
        assert!(h.controller.hover(0).is_none());
    }

    #[test]
    fn test_closed_executor_keeps_idle() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let mut controller = ScreeningController::with_executor(
            &ScreeningConfig::default(),
            MemorySurface::new("ab"),
            ExecutorHandle::from_sender(tx),
        );
        controller.attach();
        assert!(controller.is_active());
        assert!(!controller.is_detecting());
    }
}
