//! # OTBR NCP
//!
//! Runs a cooperatively scheduled Thread network co-processor stack inside a
//! single-threaded, readiness-driven mainloop owned by the host process.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Host loop (otbr-agent)                     │
//! │   update(ctx) ──► poll(fds, timeout) ──► process(ready)       │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                │
//! ┌──────────────────────────────▼───────────────────────────────┐
//! │                       MainloopAdapter                         │
//! │   TimerQueue        earliest deadline caps the wait timeout   │
//! │   EventTranslator   change bits ──► AgentEvent ──► emitter    │
//! │   ResetController   atomic flag, teardown then reinit         │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                │
//! ┌──────────────────────────────▼───────────────────────────────┐
//! │            Stack / StackPlatform (sim or a real NCP)          │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Components
//!
//! - [`MainloopAdapter`]: one host iteration, timeout computation, reset servicing
//! - [`TimerQueue`]: one-shot timers merged into the wait timeout
//! - [`EventTranslator`]: state change bitmask to application events
//! - [`ResetController`]: reset request flag and lifecycle
//! - [`sim::SimulatedPlatform`]: radio-free stack for the agent and tests
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use otbr_ncp::sim::{SimConfig, SimulatedPlatform};
//! use otbr_ncp::{
//!     EventEmitter, LoggingSubscriber, MainloopAdapter, MainloopContext, NcpConfig, ReadySet,
//!     SystemClock,
//! };
//!
//! let clock = Arc::new(SystemClock);
//! let platform = SimulatedPlatform::new(SimConfig::default(), clock.clone());
//! let emitter = EventEmitter::new();
//! emitter.subscribe("log", Arc::new(LoggingSubscriber));
//!
//! let mut adapter =
//!     MainloopAdapter::new(NcpConfig::default(), Box::new(platform), clock, emitter);
//! adapter.init().unwrap();
//!
//! let mut ctx = MainloopContext::new(Duration::from_secs(10));
//! adapter.update(&mut ctx);
//! // ... wait on ctx.registrations() for at most ctx.timeout ...
//! adapter.process(&ReadySet::new()).unwrap();
//! ```

pub mod adapter;
pub mod clock;
pub mod config;
pub mod context;
pub mod emitter;
pub mod error;
pub mod event;
pub mod log_bridge;
pub mod metrics;
pub mod reset;
pub mod sim;
pub mod stack;
pub mod timer_queue;
pub mod translator;

// Re-exports
pub use adapter::{MainloopAdapter, ResumeLatch};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{NcpConfig, RadioConfig, StaleTimerPolicy};
pub use context::{Interest, MainloopContext, ReadySet};
pub use emitter::{
    BroadcastSubscriber, EventEmitter, EventSubscriber, LoggingSubscriber, RecordingSubscriber,
};
pub use error::{NcpError, NcpResult, StackError};
pub use event::{AgentEvent, EventKind, ExtPanId, Pskc, ThreadVersion};
pub use log_bridge::{HostLogLevel, StackLogLevel, log_stack_line, stack_level_for_debug_level};
pub use metrics::{AdapterMetrics, MetricsSnapshot};
pub use reset::{ResetController, ResetRequester, ResetState};
pub use stack::{ChangedFlags, DeviceRole, Stack, StackPlatform, StateChangedCallback};
pub use timer_queue::{TimerAction, TimerQueue};
pub use translator::EventTranslator;
