//! Application events published to subscribers.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

use crate::error::NcpError;

/// Event kinds subscribers can receive or re-request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum EventKind {
    /// Thread network name.
    NetworkName = 1,
    /// Extended PAN ID.
    ExtPanId = 2,
    /// Whether the device is attached to a Thread network.
    ThreadState = 3,
    /// Pre-shared key for the commissioner.
    Pskc = 4,
    /// Thread protocol version.
    ThreadVersion = 5,
}

impl EventKind {
    /// Every recognized kind, in id order.
    pub const ALL: [EventKind; 5] = [
        EventKind::NetworkName,
        EventKind::ExtPanId,
        EventKind::ThreadState,
        EventKind::Pskc,
        EventKind::ThreadVersion,
    ];

    /// Numeric id used by outer surfaces.
    pub fn id(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for EventKind {
    type Error = NcpError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.id() == id)
            .ok_or(NcpError::UnknownEvent(id))
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::NetworkName => write!(f, "network_name"),
            EventKind::ExtPanId => write!(f, "ext_pan_id"),
            EventKind::ThreadState => write!(f, "thread_state"),
            EventKind::Pskc => write!(f, "pskc"),
            EventKind::ThreadVersion => write!(f, "thread_version"),
        }
    }
}

fn write_hex(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    for byte in bytes {
        write!(f, "{:02x}", byte)?;
    }
    Ok(())
}

fn parse_hex<const N: usize>(s: &str) -> Option<[u8; N]> {
    let s = s.trim();
    if s.len() != N * 2 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let mut out = [0u8; N];
    for (i, byte) in out.iter_mut().enumerate() {
        *byte = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16).ok()?;
    }
    Some(out)
}

/// 8-byte extended PAN ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ExtPanId(pub [u8; 8]);

impl ExtPanId {
    /// Parse from 16 hex digits.
    pub fn from_hex(s: &str) -> Option<Self> {
        parse_hex(s).map(Self)
    }
}

impl fmt::Display for ExtPanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_hex(f, &self.0)
    }
}

impl Serialize for ExtPanId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// 16-byte PSKc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Pskc(pub [u8; 16]);

impl Pskc {
    /// Parse from 32 hex digits.
    pub fn from_hex(s: &str) -> Option<Self> {
        parse_hex(s).map(Self)
    }
}

impl fmt::Display for Pskc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_hex(f, &self.0)
    }
}

impl Serialize for Pskc {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Thread protocol version as reported by the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadVersion(pub u16);

impl fmt::Display for ThreadVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            2 => write!(f, "1.1"),
            3 => write!(f, "1.2"),
            4 => write!(f, "1.3"),
            5 => write!(f, "1.4"),
            other => write!(f, "unknown({})", other),
        }
    }
}

/// An event delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "value", rename_all = "snake_case")]
pub enum AgentEvent {
    NetworkName(String),
    ExtPanId(ExtPanId),
    /// `true` when attached as child, router or leader.
    ThreadState(bool),
    Pskc(Pskc),
    ThreadVersion(ThreadVersion),
}

impl AgentEvent {
    /// Kind tag of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            AgentEvent::NetworkName(_) => EventKind::NetworkName,
            AgentEvent::ExtPanId(_) => EventKind::ExtPanId,
            AgentEvent::ThreadState(_) => EventKind::ThreadState,
            AgentEvent::Pskc(_) => EventKind::Pskc,
            AgentEvent::ThreadVersion(_) => EventKind::ThreadVersion,
        }
    }
}

impl fmt::Display for AgentEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentEvent::NetworkName(name) => write!(f, "network_name={}", name),
            AgentEvent::ExtPanId(id) => write!(f, "ext_pan_id={}", id),
            AgentEvent::ThreadState(attached) => write!(f, "thread_state attached={}", attached),
            AgentEvent::Pskc(pskc) => write!(f, "pskc={}", pskc),
            AgentEvent::ThreadVersion(version) => write!(f, "thread_version={}", version),
        }
    }
}
