//! OS signal handling for the agent process.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::signal::unix::{SignalKind, signal};
use tracing::{info, warn};

use otbr_ncp::ResetRequester;

use crate::waker::Waker;

/// Shutdown and reset requests raised by signals.
///
/// Every request also wakes the mainloop so it is seen without waiting out
/// the poll timeout.
#[derive(Clone)]
pub(crate) struct HostSignals {
    shutdown_requested: Arc<AtomicBool>,
    reset: ResetRequester,
    waker: Arc<Waker>,
}

impl HostSignals {
    pub fn new(reset: ResetRequester, waker: Arc<Waker>) -> Self {
        Self {
            shutdown_requested: Arc::new(AtomicBool::new(false)),
            reset,
            waker,
        }
    }

    /// Request shutdown. Returns false if one was already pending.
    pub fn request_shutdown(&self) -> bool {
        let first = !self.shutdown_requested.swap(true, Ordering::SeqCst);
        self.waker.wake();
        first
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown_requested.load(Ordering::SeqCst)
    }

    /// Ask the mainloop to restart the Thread stack.
    pub fn request_reset(&self) {
        self.reset.request();
        self.waker.wake();
    }

    /// Install SIGTERM, SIGINT and SIGHUP handlers on the current runtime.
    ///
    /// A second SIGTERM or SIGINT while shutdown is pending exits at once.
    pub fn install(&self) -> anyhow::Result<()> {
        for (kind, name) in [
            (SignalKind::terminate(), "SIGTERM"),
            (SignalKind::interrupt(), "SIGINT"),
        ] {
            let mut stream = signal(kind)?;
            let handler = self.clone();
            tokio::spawn(async move {
                while stream.recv().await.is_some() {
                    if handler.request_shutdown() {
                        info!("Received {}, shutting down", name);
                    } else {
                        warn!("Received {} again, exiting immediately", name);
                        crate::logging::flush_file_log();
                        std::process::exit(1);
                    }
                }
            });
        }

        let mut sighup = signal(SignalKind::hangup())?;
        let handler = self.clone();
        tokio::spawn(async move {
            while sighup.recv().await.is_some() {
                info!("Received SIGHUP - requesting Thread stack reset");
                handler.request_reset();
            }
        });

        info!("OS signal handlers installed (SIGTERM, SIGINT, SIGHUP)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use otbr_ncp::ResetController;

    fn signals() -> (HostSignals, ResetController, Arc<Waker>) {
        let controller = ResetController::new();
        let waker = Arc::new(Waker::new().unwrap());
        let signals = HostSignals::new(controller.requester(), waker.clone());
        (signals, controller, waker)
    }

    #[test]
    fn test_shutdown_flag() {
        let (signals, _controller, _waker) = signals();
        assert!(!signals.is_shutdown_requested());

        assert!(signals.request_shutdown());
        assert!(signals.is_shutdown_requested());
        assert!(!signals.clone().request_shutdown());
    }

    #[test]
    fn test_reset_request_reaches_controller() {
        let (signals, controller, _waker) = signals();
        signals.request_reset();
        assert!(controller.is_reset_requested());
    }

    #[tokio::test]
    async fn test_install_handlers() {
        let (signals, _controller, _waker) = signals();
        signals.install().unwrap();
    }
}
