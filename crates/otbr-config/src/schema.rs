//! Configuration schema definitions.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub agent: AgentConfig,

    #[serde(default)]
    pub radio: RadioConfig,

    #[serde(default)]
    pub log: LogConfig,

    #[serde(default)]
    pub simulation: SimulationConfig,
}

/// Pending timer handling across a stack reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaleTimers {
    #[default]
    Purge,
    Keep,
}

/// Agent configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Thread network interface name.
    #[serde(default = "default_interface_name")]
    pub interface_name: String,

    /// Longest the host loop blocks when nothing else is due.
    #[serde(default = "default_poll_timeout_ms")]
    pub poll_timeout_ms: u64,

    /// Resume the stored network after every stack (re)start.
    #[serde(default = "default_true")]
    pub resume_network: bool,

    #[serde(default)]
    pub stale_timers: StaleTimers,

    /// Print every event as a JSON line on stdout.
    #[serde(default)]
    pub print_events: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            interface_name: default_interface_name(),
            poll_timeout_ms: default_poll_timeout_ms(),
            resume_network: default_true(),
            stale_timers: StaleTimers::default(),
            print_events: false,
        }
    }
}

fn default_interface_name() -> String {
    "wpan0".to_string()
}

fn default_poll_timeout_ms() -> u64 {
    10_000
}

fn default_true() -> bool {
    true
}

/// Radio co-processor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadioConfig {
    /// Radio device path or URL.
    #[serde(default)]
    pub device: Option<String>,

    /// Radio driver configuration string.
    #[serde(default)]
    pub config: Option<String>,

    #[serde(default = "default_true")]
    pub reset_radio: bool,

    #[serde(default = "default_speed_up_factor")]
    pub speed_up_factor: u32,
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            device: None,
            config: None,
            reset_radio: default_true(),
            speed_up_factor: default_speed_up_factor(),
        }
    }
}

fn default_speed_up_factor() -> u32 {
    1
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Syslog level 0..=7.
    #[serde(default = "default_log_level")]
    pub level: i32,

    /// Also log to the console at debug detail.
    #[serde(default)]
    pub verbose: bool,

    /// Directory for daily rolling log files. Console only when unset.
    #[serde(default)]
    pub file_dir: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            verbose: false,
            file_dir: None,
        }
    }
}

fn default_log_level() -> i32 {
    6
}

/// Simulated NCP parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_network_name")]
    pub network_name: String,

    /// Extended PAN ID as 16 hex digits.
    #[serde(default = "default_ext_pan_id")]
    pub ext_pan_id: String,

    /// PSKc as 32 hex digits.
    #[serde(default = "default_pskc")]
    pub pskc: String,

    #[serde(default = "default_thread_version")]
    pub thread_version: u16,

    #[serde(default = "default_attach_delay_ms")]
    pub attach_delay_ms: u64,

    /// Whether an active dataset is commissioned.
    #[serde(default = "default_true")]
    pub dataset: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            network_name: default_network_name(),
            ext_pan_id: default_ext_pan_id(),
            pskc: default_pskc(),
            thread_version: default_thread_version(),
            attach_delay_ms: default_attach_delay_ms(),
            dataset: default_true(),
        }
    }
}

fn default_network_name() -> String {
    "OpenThread".to_string()
}

fn default_ext_pan_id() -> String {
    "dead00beef00cafe".to_string()
}

fn default_pskc() -> String {
    "c23a76e98f1a6483639b1ac1271e2e27".to_string()
}

fn default_thread_version() -> u16 {
    4
}

fn default_attach_delay_ms() -> u64 {
    1000
}
