//! Interface to the cooperatively scheduled Thread stack.
//!
//! The adapter never talks to a radio directly. A [`StackPlatform`] brings a
//! [`Stack`] instance up and tears the platform binding down again; the
//! instance itself is driven through the methods below, always from the
//! mainloop thread.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

use crate::config::RadioConfig;
use crate::context::{MainloopContext, ReadySet};
use crate::error::StackError;
use crate::event::{ExtPanId, Pskc, ThreadVersion};
use crate::log_bridge::StackLogLevel;
use crate::reset::ResetRequester;

/// Bitmask of stack state changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ChangedFlags(u32);

impl ChangedFlags {
    pub const NONE: ChangedFlags = ChangedFlags(0);
    pub const IP6_ADDRESS_ADDED: ChangedFlags = ChangedFlags(1 << 0);
    pub const IP6_ADDRESS_REMOVED: ChangedFlags = ChangedFlags(1 << 1);
    /// Device role changed.
    pub const ROLE: ChangedFlags = ChangedFlags(1 << 2);
    pub const PARTITION_ID: ChangedFlags = ChangedFlags(1 << 7);
    pub const NETWORK_DATA: ChangedFlags = ChangedFlags(1 << 9);
    pub const CHANNEL: ChangedFlags = ChangedFlags(1 << 14);
    pub const PAN_ID: ChangedFlags = ChangedFlags(1 << 15);
    pub const NETWORK_NAME: ChangedFlags = ChangedFlags(1 << 16);
    pub const EXT_PANID: ChangedFlags = ChangedFlags(1 << 17);

    pub const fn from_bits(bits: u32) -> Self {
        ChangedFlags(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Check if every bit of `other` is set.
    pub const fn contains(self, other: ChangedFlags) -> bool {
        other.0 != 0 && (self.0 & other.0) == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for ChangedFlags {
    type Output = ChangedFlags;

    fn bitor(self, rhs: ChangedFlags) -> ChangedFlags {
        ChangedFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for ChangedFlags {
    fn bitor_assign(&mut self, rhs: ChangedFlags) {
        self.0 |= rhs.0;
    }
}

impl fmt::LowerHex for ChangedFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

/// Thread device role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceRole {
    Disabled,
    Detached,
    Child,
    Router,
    Leader,
    /// Raw role value this adapter does not recognize.
    Unknown(u8),
}

impl DeviceRole {
    /// Map a raw stack role value.
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            0 => DeviceRole::Disabled,
            1 => DeviceRole::Detached,
            2 => DeviceRole::Child,
            3 => DeviceRole::Router,
            4 => DeviceRole::Leader,
            other => DeviceRole::Unknown(other),
        }
    }

    /// Attached means child, router or leader. Anything else, including
    /// unrecognized roles, counts as detached.
    pub fn is_attached(self) -> bool {
        matches!(
            self,
            DeviceRole::Child | DeviceRole::Router | DeviceRole::Leader
        )
    }
}

impl fmt::Display for DeviceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceRole::Disabled => write!(f, "disabled"),
            DeviceRole::Detached => write!(f, "detached"),
            DeviceRole::Child => write!(f, "child"),
            DeviceRole::Router => write!(f, "router"),
            DeviceRole::Leader => write!(f, "leader"),
            DeviceRole::Unknown(raw) => write!(f, "unknown({})", raw),
        }
    }
}

/// Callback the stack invokes when its state changes.
pub type StateChangedCallback = Box<dyn FnMut(ChangedFlags) + Send>;

/// A live Thread stack instance.
pub trait Stack: Send {
    /// Whether tasklets are queued and ready to run now.
    fn has_pending_work(&self) -> bool;

    /// Run queued tasklets. Returns once the queue present at entry is drained.
    fn process_pending_work(&mut self);

    /// Register descriptors and lower `context.timeout` to the stack's own
    /// "call me again within" hint.
    fn update(&mut self, context: &mut MainloopContext);

    /// Handle descriptors reported ready by the host wait.
    fn process(&mut self, ready: &ReadySet);

    fn device_role(&self) -> DeviceRole;

    fn network_name(&self) -> String;

    fn extended_pan_id(&self) -> ExtPanId;

    fn pskc(&self) -> Pskc;

    fn thread_version(&self) -> ThreadVersion;

    /// Install the state change callback.
    fn set_state_changed_callback(
        &mut self,
        callback: StateChangedCallback,
    ) -> Result<(), StackError>;

    fn set_log_level(&mut self, level: StackLogLevel) -> Result<(), StackError>;

    /// Bring the interface up and attach using the stored dataset.
    fn try_resume_network(&mut self) -> Result<(), StackError>;

    /// Release the instance. Consuming `self` makes a second finalize impossible.
    fn finalize(self: Box<Self>);
}

/// Brings stack instances up on a radio and releases the platform binding.
pub trait StackPlatform: Send {
    /// Initialize the platform and create a stack instance.
    ///
    /// `reset` is how the platform signals that the stack must be restarted.
    fn init(
        &mut self,
        radio: &RadioConfig,
        reset: ResetRequester,
    ) -> Result<Box<dyn Stack>, StackError>;

    /// Release the platform binding. Called after the instance is finalized.
    fn deinit(&mut self);
}
