//! Software timer list merged into the mainloop timeout.
//!
//! Timers are one-shot: an action runs once when its deadline passes and is
//! then gone. There is no cancellation handle; the only bulk removal is
//! [`TimerQueue::clear`], used when the stack is reset.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tracing::{debug, trace};

/// Action run when a timer expires.
pub type TimerAction = Box<dyn FnOnce() + Send + 'static>;

/// Ordering key: deadline first, then insertion sequence for ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct TimerKey {
    deadline: Instant,
    seq: u64,
}

#[derive(Default)]
struct TimerQueueInner {
    timers: BTreeMap<TimerKey, TimerAction>,
    next_seq: u64,
}

/// Earliest-deadline-first timer queue.
///
/// Cloning yields another handle to the same queue, so any component can
/// post timers without holding the adapter.
#[derive(Clone, Default)]
pub struct TimerQueue {
    inner: Arc<Mutex<TimerQueueInner>>,
}

impl TimerQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `action` to run once `deadline` has passed.
    pub fn schedule<F>(&self, deadline: Instant, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut inner = self.inner.lock();
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.timers.insert(TimerKey { deadline, seq }, Box::new(action));
        trace!(seq, pending = inner.timers.len(), "Timer scheduled");
    }

    /// Deadline of the next timer to fire, if any.
    pub fn earliest_deadline(&self) -> Option<Instant> {
        self.inner
            .lock()
            .timers
            .first_key_value()
            .map(|(key, _)| key.deadline)
    }

    /// Fire every timer whose deadline is at or before `now`.
    ///
    /// Timers scheduled by an action during this call are left for the next
    /// call, even when already due. Each entry is removed and the lock is
    /// released before its action runs. Returns the number of timers fired.
    pub fn fire_expired(&self, now: Instant) -> usize {
        let seq_limit = self.inner.lock().next_seq;
        let mut fired = 0;

        while let Some(action) = self.pop_due(now, seq_limit) {
            action();
            fired += 1;
        }

        if fired > 0 {
            debug!(fired, "Fired expired timers");
        }
        fired
    }

    fn pop_due(&self, now: Instant, seq_limit: u64) -> Option<TimerAction> {
        let mut inner = self.inner.lock();
        let key = inner
            .timers
            .keys()
            .take_while(|key| key.deadline <= now)
            .find(|key| key.seq < seq_limit)
            .copied()?;
        inner.timers.remove(&key)
    }

    /// Number of pending timers.
    pub fn len(&self) -> usize {
        self.inner.lock().timers.len()
    }

    /// Check if no timers are pending.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().timers.is_empty()
    }

    /// Drop all pending timers without running them. Returns how many were dropped.
    pub fn clear(&self) -> usize {
        let mut inner = self.inner.lock();
        let dropped = inner.timers.len();
        inner.timers.clear();
        dropped
    }
}

impl fmt::Debug for TimerQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerQueue")
            .field("pending", &self.len())
            .field("earliest", &self.earliest_deadline())
            .finish()
    }
}

#[cfg(test)]
#[path = "timer_queue_tests.rs"]
mod tests;
