//! Debounce deadline tracking
//!
//! Pure bookkeeping: the caller supplies `now`, the driver owns the timer.

use std::time::Duration;

use tokio::time::Instant;

/// Restartable single deadline
#[derive(Clone, Debug)]
pub struct Debouncer {
    interval: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            deadline: None,
        }
    }

    /// (Re)start the quiet period from `now`
    pub fn schedule(&mut self, now: Instant) -> Instant {
        let deadline = now + self.interval;
        self.deadline = Some(deadline);
        deadline
    }

    /// Drop any pending deadline
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Consume the deadline if it has passed
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_millis(500);

    #[test]
    fn test_fires_after_interval() {
        let mut debouncer = Debouncer::new(INTERVAL);
        let t0 = Instant::now();
        debouncer.schedule(t0);

        assert!(!debouncer.fire(t0 + Duration::from_millis(499)));
        assert!(debouncer.fire(t0 + INTERVAL));
        assert!(!debouncer.is_pending());
        assert!(!debouncer.fire(t0 + INTERVAL * 2));
    }

    #[test]
    fn test_reschedule_extends_deadline() {
        let mut debouncer = Debouncer::new(INTERVAL);
        let t0 = Instant::now();
        debouncer.schedule(t0);
        debouncer.schedule(t0 + Duration::from_millis(400));

        assert!(!debouncer.fire(t0 + INTERVAL));
        assert!(debouncer.fire(t0 + Duration::from_millis(900)));
    }

    #[test]
    fn test_cancel() {
        let mut debouncer = Debouncer::new(INTERVAL);
        let t0 = Instant::now();
        debouncer.schedule(t0);
        debouncer.cancel();

        assert_eq!(debouncer.deadline(), None);
        assert!(!debouncer.fire(t0 + INTERVAL));
    }
}
