//! Debounced recompute scheduling.
//!
//! Time is passed in by the caller as a monotonic [`Duration`] since some
//! fixed origin, so the scheduler works the same under a test clock, a
//! native `Instant` and a browser's `performance.now()`.
//!
//! Every started recompute gets a generation number. Only the result of the
//! most recently started generation may be applied, which makes the visible
//! output follow start order even when runs finish out of order.

use std::time::Duration;

use crate::pipeline::{CancelSource, CancelToken};

#[derive(Debug, Clone)]
pub struct RecomputeScheduler {
    debounce: Duration,
    dirty_since: Option<Duration>,
    started: u64,
    cancel: CancelSource,
}

impl RecomputeScheduler {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            dirty_since: None,
            started: 0,
            cancel: CancelSource::new(),
        }
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Record a parameter change at `now`.
    ///
    /// Restarts the quiet period and cancels any recompute in flight, whose
    /// result would be stale anyway.
    pub fn mark_dirty(&mut self, now: Duration) {
        self.dirty_since = Some(now);
        self.cancel.cancel_all();
    }

    pub fn is_pending(&self) -> bool {
        self.dirty_since.is_some()
    }

    /// Time left before a pending change is due, zero when overdue.
    pub fn time_until_due(&self, now: Duration) -> Option<Duration> {
        self.dirty_since
            .map(|since| (since + self.debounce).saturating_sub(now))
    }

    /// Start a recompute if the quiet period has elapsed.
    pub fn poll(&mut self, now: Duration) -> Option<CancelToken> {
        let since = self.dirty_since?;
        if now.saturating_sub(since) < self.debounce {
            return None;
        }
        Some(self.start())
    }

    /// Start a recompute immediately, ignoring the debounce.
    pub fn flush(&mut self) -> CancelToken {
        self.start()
    }

    /// Whether `generation` is the most recently started recompute and no
    /// change has been recorded since.
    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.started && self.dirty_since.is_none()
    }

    pub fn latest_generation(&self) -> u64 {
        self.started
    }

    /// Forget pending work and invalidate anything in flight, so no result
    /// started before this call is ever current again.
    pub fn clear(&mut self) {
        self.dirty_since = None;
        self.started += 1;
        self.cancel.cancel_all();
    }

    fn start(&mut self) -> CancelToken {
        self.dirty_since = None;
        self.started += 1;
        tracing::debug!(generation = self.started, "recompute started");
        self.cancel.issue(self.started)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEBOUNCE: Duration = Duration::from_millis(150);

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_idle_scheduler_never_starts() {
        let mut scheduler = RecomputeScheduler::new(DEBOUNCE);
        assert!(!scheduler.is_pending());
        assert!(scheduler.poll(ms(10_000)).is_none());
        assert_eq!(scheduler.time_until_due(ms(0)), None);
    }

    #[test]
    fn test_waits_for_quiet_period() {
        let mut scheduler = RecomputeScheduler::new(DEBOUNCE);
        scheduler.mark_dirty(ms(100));

        assert!(scheduler.poll(ms(200)).is_none());
        assert_eq!(scheduler.time_until_due(ms(200)), Some(ms(50)));

        let token = scheduler.poll(ms(250)).unwrap();
        assert_eq!(token.generation(), 1);
        assert!(!scheduler.is_pending());
        assert!(scheduler.poll(ms(1000)).is_none());
    }

    #[test]
    fn test_burst_of_changes_coalesces() {
        let mut scheduler = RecomputeScheduler::new(DEBOUNCE);
        for t in (0..=300).step_by(50) {
            scheduler.mark_dirty(ms(t));
            assert!(scheduler.poll(ms(t)).is_none());
        }

        assert!(scheduler.poll(ms(449)).is_none());
        let token = scheduler.poll(ms(450)).unwrap();
        assert_eq!(token.generation(), 1);
        assert_eq!(scheduler.latest_generation(), 1);
    }

    #[test]
    fn test_new_change_cancels_in_flight() {
        let mut scheduler = RecomputeScheduler::new(DEBOUNCE);
        scheduler.mark_dirty(ms(0));
        let first = scheduler.poll(ms(150)).unwrap();
        assert!(!first.is_cancelled());

        scheduler.mark_dirty(ms(200));
        assert!(first.is_cancelled());
        assert!(!scheduler.is_current(first.generation()));

        let second = scheduler.poll(ms(350)).unwrap();
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert!(scheduler.is_current(second.generation()));
    }

    #[test]
    fn test_only_latest_start_is_current() {
        let mut scheduler = RecomputeScheduler::new(DEBOUNCE);
        let first = scheduler.flush();
        let second = scheduler.flush();

        assert!(first.is_cancelled());
        assert!(!scheduler.is_current(first.generation()));
        assert!(scheduler.is_current(second.generation()));
    }

    #[test]
    fn test_zero_debounce_starts_on_next_poll() {
        let mut scheduler = RecomputeScheduler::new(Duration::ZERO);
        scheduler.mark_dirty(ms(5));
        assert!(scheduler.poll(ms(5)).is_some());
    }

    #[test]
    fn test_clear_drops_pending_and_cancels() {
        let mut scheduler = RecomputeScheduler::new(DEBOUNCE);
        let token = scheduler.flush();
        scheduler.mark_dirty(ms(0));
        scheduler.clear();

        assert!(token.is_cancelled());
        assert!(!scheduler.is_current(token.generation()));
        assert!(!scheduler.is_pending());
        assert!(scheduler.poll(ms(1000)).is_none());
    }
}
