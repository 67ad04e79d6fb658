//! Cancellable deferred tasks
//!
//! The controller schedules one kind of deferred work (unmuting after a
//! muted start) and must be able to cancel it when playback is paused
//! first. Hosts report a fired task back through
//! [`AudioController::timer_fired`](crate::AudioController::timer_fired).

use crate::types::TimerId;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Duration;

/// Source of cancellable one-shot timers
pub trait Scheduler {
    /// Arm a timer that fires once after `delay`
    fn schedule(&mut self, delay: Duration) -> TimerId;

    /// Disarm a timer. Unknown or already fired ids are ignored.
    fn cancel(&mut self, id: TimerId);

    /// The host delivered `id`. Releases any bookkeeping kept for it.
    fn fired(&mut self, _id: TimerId) {}
}

#[derive(Debug, Default)]
struct ManualInner {
    now: Duration,
    next_id: u64,
    pending: BTreeMap<TimerId, Duration>,
}

/// Deterministic scheduler driven by explicit time advancement
///
/// Clones share the same clock, so the host keeps one handle to call
/// [`advance`](Self::advance) while the controller owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    inner: Rc<RefCell<ManualInner>>,
}

impl ManualScheduler {
    /// Create a scheduler at time zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time
    pub fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    /// Number of armed timers
    pub fn pending(&self) -> usize {
        self.inner.borrow().pending.len()
    }

    /// Move the clock forward and return timers that came due
    ///
    /// Fired timers are ordered by deadline, then by creation order.
    pub fn advance(&self, by: Duration) -> Vec<TimerId> {
        let mut inner = self.inner.borrow_mut();
        inner.now += by;
        let now = inner.now;

        let mut due: Vec<(Duration, TimerId)> = inner
            .pending
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(id, deadline)| (*deadline, *id))
            .collect();
        due.sort();

        for (_, id) in &due {
            inner.pending.remove(id);
        }
        due.into_iter().map(|(_, id)| id).collect()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self, delay: Duration) -> TimerId {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let id = TimerId(inner.next_id);
        let deadline = inner.now + delay;
        inner.pending.insert(id, deadline);
        id
    }

    fn cancel(&mut self, id: TimerId) {
        self.inner.borrow_mut().pending.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_only_when_due() {
        let handle = ManualScheduler::new();
        let mut scheduler = handle.clone();
        let id = scheduler.schedule(Duration::from_millis(150));

        assert!(handle.advance(Duration::from_millis(149)).is_empty());
        assert_eq!(handle.advance(Duration::from_millis(1)), vec![id]);
        assert_eq!(handle.pending(), 0);
        assert!(handle.advance(Duration::from_secs(10)).is_empty());
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let handle = ManualScheduler::new();
        let mut scheduler = handle.clone();
        let id = scheduler.schedule(Duration::from_millis(150));
        scheduler.cancel(id);

        assert!(handle.advance(Duration::from_secs(1)).is_empty());
        // Cancelling twice is harmless
        scheduler.cancel(id);
    }

    #[test]
    fn fires_in_deadline_order() {
        let handle = ManualScheduler::new();
        let mut scheduler = handle.clone();
        let late = scheduler.schedule(Duration::from_millis(300));
        let early = scheduler.schedule(Duration::from_millis(100));

        assert_eq!(handle.advance(Duration::from_secs(1)), vec![early, late]);
        assert_eq!(handle.now(), Duration::from_secs(1));
    }
}
