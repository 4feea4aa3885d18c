//! Adapter configuration.

use serde::{Deserialize, Serialize};

/// What to do with pending timers when the stack is reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaleTimerPolicy {
    /// Drop timers scheduled against the old instance.
    #[default]
    Purge,
    /// Let them fire against the new instance.
    Keep,
}

/// Radio and interface settings handed to the platform on init.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadioConfig {
    /// Thread network interface name.
    #[serde(default = "default_interface_name")]
    pub interface_name: String,

    /// Radio device path or URL.
    #[serde(default)]
    pub device: Option<String>,

    /// Radio driver configuration string.
    #[serde(default)]
    pub config: Option<String>,

    /// Reset the radio co-processor on init.
    #[serde(default = "default_true")]
    pub reset_radio: bool,

    /// Simulation time acceleration.
    #[serde(default = "default_speed_up_factor")]
    pub speed_up_factor: u32,
}

fn default_interface_name() -> String {
    "wpan0".to_string()
}

fn default_true() -> bool {
    true
}

fn default_speed_up_factor() -> u32 {
    1
}

fn default_debug_level() -> i32 {
    6
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            interface_name: default_interface_name(),
            device: None,
            config: None,
            reset_radio: default_true(),
            speed_up_factor: default_speed_up_factor(),
        }
    }
}

/// Mainloop adapter configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NcpConfig {
    #[serde(default)]
    pub radio: RadioConfig,

    /// Attempt to resume the stored network once per stack instance.
    #[serde(default = "default_true")]
    pub resume_network: bool,

    #[serde(default)]
    pub stale_timers: StaleTimerPolicy,

    /// Host debug level on the syslog scale (0..=7).
    #[serde(default = "default_debug_level")]
    pub debug_level: i32,
}

impl Default for NcpConfig {
    fn default() -> Self {
        Self {
            radio: RadioConfig::default(),
            resume_network: default_true(),
            stale_timers: StaleTimerPolicy::default(),
            debug_level: default_debug_level(),
        }
    }
}
