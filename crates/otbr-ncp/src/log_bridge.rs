//! Mapping between stack log levels and host severities.
//!
//! The stack has its own six-step level scale. Lines coming out of the stack
//! are re-emitted through `tracing` under the `otbr::stack` target, and the
//! host's syslog-style debug level is translated into the level the stack
//! filters on.

use std::fmt;

use tracing::{debug, error, info, warn};

use crate::error::{NcpError, NcpResult};

/// Target used for every bridged stack line.
pub const STACK_LOG_TARGET: &str = "otbr::stack";

/// Stack log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum StackLogLevel {
    None = 0,
    Crit = 1,
    Warn = 2,
    Note = 3,
    Info = 4,
    Debg = 5,
}

impl StackLogLevel {
    /// Map a raw stack level. Returns `None` for values outside the scale.
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(StackLogLevel::None),
            1 => Some(StackLogLevel::Crit),
            2 => Some(StackLogLevel::Warn),
            3 => Some(StackLogLevel::Note),
            4 => Some(StackLogLevel::Info),
            5 => Some(StackLogLevel::Debg),
            _ => None,
        }
    }
}

impl fmt::Display for StackLogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StackLogLevel::None => "NONE",
            StackLogLevel::Crit => "CRIT",
            StackLogLevel::Warn => "WARN",
            StackLogLevel::Note => "NOTE",
            StackLogLevel::Info => "INFO",
            StackLogLevel::Debg => "DEBG",
        };
        f.write_str(name)
    }
}

/// Host severity on the syslog scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum HostLogLevel {
    Emergency = 0,
    Alert = 1,
    Critical = 2,
    Error = 3,
    Warning = 4,
    Notice = 5,
    Info = 6,
    Debug = 7,
}

impl HostLogLevel {
    /// Map a syslog level (0..=7).
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(HostLogLevel::Emergency),
            1 => Some(HostLogLevel::Alert),
            2 => Some(HostLogLevel::Critical),
            3 => Some(HostLogLevel::Error),
            4 => Some(HostLogLevel::Warning),
            5 => Some(HostLogLevel::Notice),
            6 => Some(HostLogLevel::Info),
            7 => Some(HostLogLevel::Debug),
            _ => None,
        }
    }

    /// Host severity for a raw stack level. Unknown values log at debug.
    pub fn from_stack(raw: u8) -> Self {
        match StackLogLevel::from_raw(raw) {
            Some(StackLogLevel::None) => HostLogLevel::Emergency,
            Some(StackLogLevel::Crit) => HostLogLevel::Critical,
            Some(StackLogLevel::Warn) => HostLogLevel::Warning,
            Some(StackLogLevel::Note) => HostLogLevel::Notice,
            Some(StackLogLevel::Info) => HostLogLevel::Info,
            Some(StackLogLevel::Debg) | None => HostLogLevel::Debug,
        }
    }

    /// Stack level that lets through everything at this severity or above.
    pub fn stack_level(self) -> StackLogLevel {
        match self {
            HostLogLevel::Emergency | HostLogLevel::Alert | HostLogLevel::Critical => {
                StackLogLevel::Crit
            }
            HostLogLevel::Error | HostLogLevel::Warning => StackLogLevel::Warn,
            HostLogLevel::Notice => StackLogLevel::Note,
            HostLogLevel::Info => StackLogLevel::Info,
            HostLogLevel::Debug => StackLogLevel::Debg,
        }
    }

    /// Closest `tracing` level.
    pub fn tracing_level(self) -> tracing::Level {
        match self {
            HostLogLevel::Emergency
            | HostLogLevel::Alert
            | HostLogLevel::Critical
            | HostLogLevel::Error => tracing::Level::ERROR,
            HostLogLevel::Warning => tracing::Level::WARN,
            HostLogLevel::Notice | HostLogLevel::Info => tracing::Level::INFO,
            HostLogLevel::Debug => tracing::Level::DEBUG,
        }
    }
}

/// Translate a host debug level into the stack's log level.
pub fn stack_level_for_debug_level(debug_level: i32) -> NcpResult<StackLogLevel> {
    HostLogLevel::from_raw(debug_level)
        .map(HostLogLevel::stack_level)
        .ok_or(NcpError::InvalidDebugLevel(debug_level))
}

/// Re-emit one stack log line through `tracing`.
pub fn log_stack_line(raw_level: u8, region: &str, message: &str) {
    let severity = HostLogLevel::from_stack(raw_level);
    match severity {
        HostLogLevel::Emergency
        | HostLogLevel::Alert
        | HostLogLevel::Critical
        | HostLogLevel::Error => {
            error!(target: STACK_LOG_TARGET, region, severity = ?severity, "{}", message)
        }
        HostLogLevel::Warning => warn!(target: STACK_LOG_TARGET, region, "{}", message),
        HostLogLevel::Notice | HostLogLevel::Info => {
            info!(target: STACK_LOG_TARGET, region, severity = ?severity, "{}", message)
        }
        HostLogLevel::Debug => debug!(target: STACK_LOG_TARGET, region, "{}", message),
    }
}
