//! Host mainloop: poll, then let the adapter run one iteration.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info};

use otbr_ncp::{Interest, MainloopAdapter, MainloopContext};

use crate::readiness;
use crate::signal::HostSignals;
use crate::waker::Waker;

/// Owns the adapter and runs it until shutdown is requested.
pub(crate) struct HostLoop {
    adapter: MainloopAdapter,
    signals: HostSignals,
    waker: Arc<Waker>,
    poll_timeout: Duration,
}

impl HostLoop {
    pub fn new(
        adapter: MainloopAdapter,
        signals: HostSignals,
        waker: Arc<Waker>,
        poll_timeout: Duration,
    ) -> Self {
        Self {
            adapter,
            signals,
            waker,
            poll_timeout,
        }
    }

    /// Run until shutdown. A failed poll or a failed stack restart ends the
    /// loop with an error.
    pub fn run(mut self) -> Result<()> {
        info!("HostLoop: started (poll timeout {:?})", self.poll_timeout);
        let wake_fd = self.waker.read_fd();

        while !self.signals.is_shutdown_requested() {
            let mut context = MainloopContext::new(self.poll_timeout);
            context.register(wake_fd, Interest::READABLE);
            self.adapter.update(&mut context);

            let ready = readiness::wait(&context).context("readiness wait failed")?;
            if ready.is_ready(wake_fd, Interest::READABLE) {
                debug!("HostLoop: woken");
                self.waker.drain();
            }

            self.adapter
                .process(&ready)
                .context("mainloop iteration failed")?;
        }

        let metrics = self.adapter.metrics().snapshot();
        info!(
            iterations = metrics.iterations,
            resets = metrics.resets,
            events = metrics.events_emitted,
            "HostLoop: stopped"
        );
        self.adapter.shutdown();
        Ok(())
    }
}
