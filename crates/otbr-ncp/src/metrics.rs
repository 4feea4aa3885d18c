//! Adapter counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Running totals for the adapter.
#[derive(Debug, Default)]
pub struct AdapterMetrics {
    /// Completed `process` calls.
    pub iterations: AtomicU64,

    /// State change notifications translated.
    pub state_changes: AtomicU64,

    /// Events emitted to subscribers.
    pub events_emitted: AtomicU64,

    /// Timers fired.
    pub timers_fired: AtomicU64,

    /// Timers dropped by a reset.
    pub timers_purged: AtomicU64,

    /// Resume network attempts.
    pub resume_attempts: AtomicU64,

    /// Reset cycles serviced.
    pub resets: AtomicU64,
}

impl AdapterMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_iteration(&self) {
        self.iterations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_state_change(&self, events: u64) {
        self.state_changes.fetch_add(1, Ordering::Relaxed);
        self.events_emitted.fetch_add(events, Ordering::Relaxed);
    }

    pub fn record_event(&self) {
        self.events_emitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_timers_fired(&self, count: u64) {
        self.timers_fired.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_timers_purged(&self, count: u64) {
        self.timers_purged.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_resume_attempt(&self) {
        self.resume_attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_reset(&self) {
        self.resets.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of every counter.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            iterations: self.iterations.load(Ordering::Relaxed),
            state_changes: self.state_changes.load(Ordering::Relaxed),
            events_emitted: self.events_emitted.load(Ordering::Relaxed),
            timers_fired: self.timers_fired.load(Ordering::Relaxed),
            timers_purged: self.timers_purged.load(Ordering::Relaxed),
            resume_attempts: self.resume_attempts.load(Ordering::Relaxed),
            resets: self.resets.load(Ordering::Relaxed),
        }
    }
}

/// Serializable copy of [`AdapterMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MetricsSnapshot {
    pub iterations: u64,
    pub state_changes: u64,
    pub events_emitted: u64,
    pub timers_fired: u64,
    pub timers_purged: u64,
    pub resume_attempts: u64,
    pub resets: u64,
}
