//! Mainloop adapter.
//!
//! Drives one Thread stack instance from a host-owned readiness loop. Every
//! host iteration calls [`MainloopAdapter::update`] before blocking and
//! [`MainloopAdapter::process`] after waking:
//!
//! ```text
//! update:  timeout = 0 if tasklets pending, else min(host, next timer)
//!          stack registers descriptors and may lower the timeout
//! wait:    host readiness primitive
//! process: drain tasklets -> stack readiness -> fire timers
//!          -> resume network (until it succeeds) -> service reset
//! ```
//!
//! State changes the stack raises during any of these calls are queued by
//! the registered callback and translated right after the call returns.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::clock::Clock;
use crate::config::{NcpConfig, StaleTimerPolicy};
use crate::context::{MainloopContext, ReadySet};
use crate::emitter::EventEmitter;
use crate::error::{NcpError, NcpResult};
use crate::event::EventKind;
use crate::log_bridge::stack_level_for_debug_level;
use crate::metrics::AdapterMetrics;
use crate::reset::{ResetController, ResetRequester};
use crate::stack::{ChangedFlags, DeviceRole, Stack, StackPlatform};
use crate::timer_queue::TimerQueue;
use crate::translator::EventTranslator;

/// Network resume latch, scoped to a stack instance.
///
/// Closes on the first successful attempt. A failed attempt is retried on the
/// next iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeLatch {
    Pending,
    Done,
}

type ChangeInbox = Arc<Mutex<VecDeque<ChangedFlags>>>;

/// Integrates a [`Stack`] into a single-threaded readiness loop.
pub struct MainloopAdapter {
    config: NcpConfig,
    platform: Box<dyn StackPlatform>,
    stack: Option<Box<dyn Stack>>,
    platform_bound: bool,
    clock: Arc<dyn Clock>,
    timers: TimerQueue,
    translator: EventTranslator,
    reset: Arc<ResetController>,
    changes: ChangeInbox,
    resume: ResumeLatch,
    metrics: Arc<AdapterMetrics>,
}

impl MainloopAdapter {
    /// Create an adapter. No stack exists until [`init`](Self::init).
    pub fn new(
        config: NcpConfig,
        platform: Box<dyn StackPlatform>,
        clock: Arc<dyn Clock>,
        emitter: EventEmitter,
    ) -> Self {
        Self {
            config,
            platform,
            stack: None,
            platform_bound: false,
            clock,
            timers: TimerQueue::new(),
            translator: EventTranslator::new(emitter),
            reset: Arc::new(ResetController::new()),
            changes: Arc::new(Mutex::new(VecDeque::new())),
            resume: ResumeLatch::Pending,
            metrics: Arc::new(AdapterMetrics::new()),
        }
    }

    /// Bring up the platform and the stack instance.
    ///
    /// Fails if the platform cannot create an instance, the state change
    /// callback cannot be installed, or the log level is rejected. On failure
    /// nothing stays bound.
    pub fn init(&mut self) -> NcpResult<()> {
        if self.stack.is_some() {
            debug!("MainloopAdapter: init called with a live stack, ignoring");
            return Ok(());
        }
        self.bring_up()
    }

    fn bring_up(&mut self) -> NcpResult<()> {
        let level = stack_level_for_debug_level(self.config.debug_level)?;

        let mut stack = self
            .platform
            .init(&self.config.radio, self.reset.requester())
            .map_err(NcpError::Init)?;
        self.platform_bound = true;

        let inbox = self.changes.clone();
        if let Err(e) = stack.set_state_changed_callback(Box::new(move |flags| {
            inbox.lock().push_back(flags);
        })) {
            error!("MainloopAdapter: failed to register state callback: {}", e);
            stack.finalize();
            self.release_platform();
            return Err(NcpError::StateCallback(e));
        }

        if let Err(e) = stack.set_log_level(level) {
            error!("MainloopAdapter: stack rejected log level {}: {}", level, e);
            stack.finalize();
            self.release_platform();
            return Err(NcpError::LogLevel(e));
        }

        self.stack = Some(stack);
        self.resume = ResumeLatch::Pending;
        info!(
            "MainloopAdapter: Thread stack up on {} (log level {})",
            self.config.radio.interface_name, level
        );
        Ok(())
    }

    /// Finalize the stack and release the platform. Safe to call repeatedly.
    pub fn shutdown(&mut self) {
        if self.stack.is_some() || self.platform_bound {
            info!("MainloopAdapter: shutting down Thread stack");
        }
        self.tear_down();
    }

    fn tear_down(&mut self) {
        if let Some(stack) = self.stack.take() {
            stack.finalize();
            debug!("MainloopAdapter: stack instance finalized");
        }
        self.release_platform();
        self.changes.lock().clear();
    }

    fn release_platform(&mut self) {
        if self.platform_bound {
            self.platform.deinit();
            self.platform_bound = false;
        }
    }

    /// How long the host may block, given its own default.
    ///
    /// Zero while tasklets are pending. Otherwise the host value, lowered to
    /// the time until the earliest timer. Never negative.
    pub fn compute_timeout(&self, host_requested: Duration) -> Duration {
        if self
            .stack
            .as_ref()
            .is_some_and(|stack| stack.has_pending_work())
        {
            return Duration::ZERO;
        }
        match self.timers.earliest_deadline() {
            Some(deadline) => {
                host_requested.min(deadline.saturating_duration_since(self.clock.now()))
            }
            None => host_requested,
        }
    }

    /// Prepare `context` for the host's readiness wait.
    pub fn update(&mut self, context: &mut MainloopContext) {
        context.timeout = self.compute_timeout(context.timeout);
        if let Some(stack) = self.stack.as_mut() {
            stack.update(context);
        }
        self.dispatch_changes();
    }

    /// Run one iteration after the host's readiness wait.
    ///
    /// Returns an error only when a reset was serviced and the stack could
    /// not be brought back, or when no stack is live.
    pub fn process(&mut self, ready: &ReadySet) -> NcpResult<()> {
        let stack = self.stack.as_mut().ok_or(NcpError::NotInitialized)?;
        stack.process_pending_work();
        self.dispatch_changes();

        if let Some(stack) = self.stack.as_mut() {
            stack.process(ready);
        }
        self.dispatch_changes();

        let now = self.clock.now();
        let fired = self.timers.fire_expired(now);
        self.metrics.record_timers_fired(fired as u64);

        self.resume_network_until_done();

        self.metrics.record_iteration();
        if self.reset.poll_request() {
            self.service_reset()?;
        }
        Ok(())
    }

    fn resume_network_until_done(&mut self) {
        if self.resume == ResumeLatch::Done {
            return;
        }

        if !self.config.resume_network {
            debug!("MainloopAdapter: network resume disabled");
            self.resume = ResumeLatch::Done;
            return;
        }
        let Some(stack) = self.stack.as_mut() else {
            return;
        };

        self.metrics.record_resume_attempt();
        match stack.try_resume_network() {
            Ok(()) => {
                info!("MainloopAdapter: resuming Thread network");
                self.resume = ResumeLatch::Done;
            }
            // Retried on the next iteration.
            Err(e) => warn!("MainloopAdapter: could not resume Thread network: {}", e),
        }
        self.dispatch_changes();
    }

    fn service_reset(&mut self) -> NcpResult<()> {
        info!("MainloopAdapter: servicing stack reset");
        let reset = self.reset.clone();
        let result = reset.perform(|| self.reinitialize());
        self.metrics.record_reset();
        result
    }

    fn reinitialize(&mut self) -> NcpResult<()> {
        self.tear_down();

        if self.config.stale_timers == StaleTimerPolicy::Purge {
            let dropped = self.timers.clear();
            if dropped > 0 {
                info!("MainloopAdapter: dropped {} timers from previous instance", dropped);
            }
            self.metrics.record_timers_purged(dropped as u64);
        }

        self.bring_up().map_err(|e| {
            error!("MainloopAdapter: reinitialization failed: {}", e);
            NcpError::Reinitialize(Box::new(e))
        })
    }

    /// Translate queued state changes, one translator call per notification.
    fn dispatch_changes(&self) {
        let Some(stack) = self.stack.as_deref() else {
            return;
        };
        loop {
            let next = self.changes.lock().pop_front();
            let Some(flags) = next else {
                break;
            };
            let emitted = self.translator.on_state_changed(stack, flags);
            self.metrics.record_state_change(emitted as u64);
        }
    }

    /// Run `action` once `deadline` has passed.
    pub fn post_timer_task<F>(&self, deadline: Instant, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.timers.schedule(deadline, action);
    }

    /// Emit the current value for `kind`.
    pub fn request_event(&self, kind: EventKind) -> NcpResult<()> {
        let stack = self.stack.as_deref().ok_or(NcpError::NotInitialized)?;
        self.translator.request_event(stack, kind);
        self.metrics.record_event();
        Ok(())
    }

    /// Emit the current value for a numeric event id.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a recognized event id.
    pub fn request_event_id(&self, id: u8) -> NcpResult<()> {
        let stack = self.stack.as_deref().ok_or(NcpError::NotInitialized)?;
        self.translator.request_event_id(stack, id);
        self.metrics.record_event();
        Ok(())
    }

    /// Shared handle to the timer queue.
    pub fn timers(&self) -> TimerQueue {
        self.timers.clone()
    }

    /// Handle for raising reset requests from other contexts.
    pub fn reset_requester(&self) -> ResetRequester {
        self.reset.requester()
    }

    pub fn reset_controller(&self) -> &ResetController {
        &self.reset
    }

    pub fn is_initialized(&self) -> bool {
        self.stack.is_some()
    }

    /// Role of the live instance.
    pub fn device_role(&self) -> Option<DeviceRole> {
        self.stack.as_ref().map(|stack| stack.device_role())
    }

    pub fn resume_latch(&self) -> ResumeLatch {
        self.resume
    }

    pub fn metrics(&self) -> Arc<AdapterMetrics> {
        self.metrics.clone()
    }

    pub fn emitter(&self) -> &EventEmitter {
        self.translator.emitter()
    }

    pub fn config(&self) -> &NcpConfig {
        &self.config
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        self.clock.clone()
    }
}

impl Drop for MainloopAdapter {
    fn drop(&mut self) {
        self.tear_down();
    }
}

#[cfg(test)]
#[path = "adapter_tests.rs"]
mod tests;
