//! Stack reset requests and the teardown/reinit lifecycle.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU64, Ordering};

use tracing::{debug, info, warn};

use crate::error::{NcpError, NcpResult};

/// Reset lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ResetState {
    /// Stack is live and driven normally.
    Running = 0,
    /// A reset request was observed; teardown has not started.
    ResetRequested = 1,
    /// The stack is being torn down and brought back up.
    Reinitializing = 2,
}

impl From<u8> for ResetState {
    fn from(v: u8) -> Self {
        match v {
            1 => ResetState::ResetRequested,
            2 => ResetState::Reinitializing,
            _ => ResetState::Running,
        }
    }
}

impl std::fmt::Display for ResetState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResetState::Running => write!(f, "running"),
            ResetState::ResetRequested => write!(f, "reset_requested"),
            ResetState::Reinitializing => write!(f, "reinitializing"),
        }
    }
}

/// Cloneable handle for raising a reset from any context.
///
/// Raising is fire-and-forget and idempotent: several requests before the
/// next check collapse into one reset.
#[derive(Debug, Clone)]
pub struct ResetRequester {
    flag: Arc<AtomicBool>,
}

impl ResetRequester {
    /// Ask the mainloop to restart the stack.
    pub fn request(&self) {
        if !self.flag.swap(true, Ordering::SeqCst) {
            debug!("Stack reset requested");
        }
    }

    /// Check if a request is waiting to be serviced.
    pub fn is_pending(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Owns the reset flag and sequences the reset lifecycle.
///
/// The flag is the only state shared across contexts. It is raised through
/// [`ResetRequester`] and observed and cleared only by the mainloop thread.
#[derive(Debug)]
pub struct ResetController {
    flag: Arc<AtomicBool>,
    state: AtomicU8,
    resets: AtomicU64,
}

impl ResetController {
    pub fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            state: AtomicU8::new(ResetState::Running as u8),
            resets: AtomicU64::new(0),
        }
    }

    /// Handle for raising reset requests.
    pub fn requester(&self) -> ResetRequester {
        ResetRequester {
            flag: self.flag.clone(),
        }
    }

    /// Check if a reset has been requested and not serviced yet.
    pub fn is_reset_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ResetState {
        ResetState::from(self.state.load(Ordering::SeqCst))
    }

    /// Number of completed reset cycles, successful or not.
    pub fn reset_count(&self) -> u64 {
        self.resets.load(Ordering::Relaxed)
    }

    /// Observe the flag. Moves Running to ResetRequested when it is set.
    ///
    /// Returns true when a reset is due.
    pub fn poll_request(&self) -> bool {
        if !self.is_reset_requested() {
            return false;
        }
        let _ = self.state.compare_exchange(
            ResetState::Running as u8,
            ResetState::ResetRequested as u8,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
        self.state() == ResetState::ResetRequested
    }

    /// Run one reset cycle.
    ///
    /// `reinit` performs the teardown and bring-up. The flag is cleared and
    /// the state returns to Running whether or not it succeeds; its error is
    /// passed through unchanged.
    pub fn perform<F>(&self, reinit: F) -> NcpResult<()>
    where
        F: FnOnce() -> NcpResult<()>,
    {
        self.transition(ResetState::ResetRequested, ResetState::Reinitializing)?;
        info!("ResetController: reinitializing Thread stack");

        let result = reinit();

        self.flag.store(false, Ordering::SeqCst);
        self.state
            .store(ResetState::Running as u8, Ordering::SeqCst);
        let count = self.resets.fetch_add(1, Ordering::Relaxed) + 1;

        match &result {
            Ok(()) => info!("ResetController: reset #{} complete", count),
            Err(e) => warn!("ResetController: reset #{} failed: {}", count, e),
        }
        result
    }

    fn transition(&self, from: ResetState, to: ResetState) -> NcpResult<()> {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| ())
            .map_err(|current| NcpError::InvalidStateTransition {
                from: ResetState::from(current),
                to,
            })
    }
}

impl Default for ResetController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "reset_tests.rs"]
mod tests;
