//! Tracing setup: console output plus an optional daily rolling log file.

use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use otbr_config::{ConfigLoader, LogConfig};
use otbr_ncp::HostLogLevel;

/// Keeps the file writer alive until [`flush_file_log`] drops it.
static GUARD: Mutex<Option<WorkerGuard>> = Mutex::new(None);

pub(crate) fn init_tracing(log: &LogConfig) -> anyhow::Result<()> {
    let level = if log.verbose {
        HostLogLevel::Debug
    } else {
        HostLogLevel::from_raw(log.level).unwrap_or(HostLogLevel::Info)
    };
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level.tracing_level()).into())
        .from_env_lossy();

    let file_layer = match &log.file_dir {
        Some(dir) => {
            let dir = PathBuf::from(ConfigLoader::expand_path(dir));
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("cannot create log directory {}", dir.display()))?;
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("otbr-agent")
                .filename_suffix("log")
                .max_log_files(30)
                .build(&dir)?;
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            keep_guard(guard);
            Some(fmt::layer().with_writer(non_blocking).with_ansi(false).boxed())
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_ansi(true))
        .with(file_layer)
        .init();

    Ok(())
}

fn keep_guard(guard: WorkerGuard) {
    if let Ok(mut slot) = GUARD.lock() {
        *slot = Some(guard);
    }
}

/// Write out buffered file log lines. Returns false if there was no file log.
///
/// Call before the process exits, including forced exits; lines logged
/// afterwards do not reach the file.
pub(crate) fn flush_file_log() -> bool {
    let guard = match GUARD.lock() {
        Ok(mut slot) => slot.take(),
        Err(poisoned) => poisoned.into_inner().take(),
    };
    let flushed = guard.is_some();
    // Blocks until the writer thread has written everything out.
    drop(guard);
    flushed
}
