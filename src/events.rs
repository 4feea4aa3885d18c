//! JSON line output for agent events.

use std::io::Write;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::warn;

use otbr_ncp::AgentEvent;

/// One event as a single JSON line, without the trailing newline.
pub(crate) fn event_line(event: &AgentEvent) -> serde_json::Result<String> {
    serde_json::to_string(event)
}

/// Print events from `rx` to stdout until the channel closes.
pub(crate) fn spawn_printer(mut rx: broadcast::Receiver<AgentEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => match event_line(&event) {
                    Ok(line) => {
                        let mut stdout = std::io::stdout().lock();
                        if writeln!(stdout, "{}", line).and_then(|_| stdout.flush()).is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!("Failed to encode event {}: {}", event.kind(), e),
                },
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Event printer lagged, {} events skipped", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}
