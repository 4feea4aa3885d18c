//! OTBR agent
//!
//! Runs a Thread stack instance inside the agent's readiness loop.

mod cli;
mod events;
mod host;
mod logging;
mod readiness;
mod settings;
mod signal;
mod waker;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, warn};

use otbr_config::{Config, ConfigLoader, ConfigValidator};
use otbr_ncp::sim::SimulatedPlatform;
use otbr_ncp::{
    BroadcastSubscriber, EventEmitter, EventKind, LoggingSubscriber, MainloopAdapter,
    SystemClock,
};

use crate::cli::Cli;
use crate::host::HostLoop;
use crate::signal::HostSignals;
use crate::waker::Waker;

/// Capacity of the channel feeding `--print-events`.
const EVENT_CHANNEL_CAPACITY: usize = 64;

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = ConfigLoader::load_or_default(cli.config.as_deref())
        .context("failed to load configuration")?;
    cli.apply(&mut config);
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    logging::init_tracing(&config.log)?;

    let result = run(config).await;
    if let Err(e) = &result {
        error!("otbr-agent failed: {:#}", e);
    }
    logging::flush_file_log();
    result
}

async fn run(config: Config) -> anyhow::Result<()> {
    info!("Starting otbr-agent v{}", env!("CARGO_PKG_VERSION"));

    let warnings = ConfigValidator::validate(&config).into_result()?;
    for warning in &warnings {
        warn!("Config: {}: {}", warning.path, warning.message);
    }

    let clock = Arc::new(SystemClock);
    let platform = SimulatedPlatform::new(settings::sim_config(&config)?, clock.clone());

    let emitter = EventEmitter::new();
    emitter.subscribe("log", Arc::new(LoggingSubscriber));

    let printer = if config.agent.print_events {
        let bridge = BroadcastSubscriber::new(EVENT_CHANNEL_CAPACITY);
        let rx = bridge.subscribe();
        emitter.subscribe("print", Arc::new(bridge));
        Some(events::spawn_printer(rx))
    } else {
        None
    };

    let mut adapter = MainloopAdapter::new(
        settings::ncp_config(&config),
        Box::new(platform),
        clock,
        emitter,
    );
    adapter.init().context("failed to initialize Thread stack")?;

    let waker = Arc::new(Waker::new().context("failed to create wake pipe")?);
    let signals = HostSignals::new(adapter.reset_requester(), waker.clone());
    signals.install()?;

    if printer.is_some() {
        for kind in EventKind::ALL {
            adapter.request_event(kind)?;
        }
    }

    let host = HostLoop::new(adapter, signals, waker, settings::poll_timeout(&config));
    tokio::task::spawn_blocking(move || host.run()).await??;

    // The adapter and its emitter are gone, so the channel is closed.
    if let Some(printer) = printer {
        let _ = printer.await;
    }

    info!("otbr-agent stopped");
    Ok(())
}
