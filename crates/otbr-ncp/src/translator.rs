//! Translation of stack state changes into application events.

use tracing::debug;

use crate::emitter::EventEmitter;
use crate::event::{AgentEvent, EventKind};
use crate::stack::{ChangedFlags, Stack};

/// Change bits that produce an event, checked in this order.
const CHANGE_EVENTS: [(ChangedFlags, EventKind); 3] = [
    (ChangedFlags::NETWORK_NAME, EventKind::NetworkName),
    (ChangedFlags::EXT_PANID, EventKind::ExtPanId),
    (ChangedFlags::ROLE, EventKind::ThreadState),
];

/// Reads current values from the stack and emits them as events.
#[derive(Clone)]
pub struct EventTranslator {
    emitter: EventEmitter,
}

impl EventTranslator {
    pub fn new(emitter: EventEmitter) -> Self {
        Self { emitter }
    }

    /// Emitter events are published on.
    pub fn emitter(&self) -> &EventEmitter {
        &self.emitter
    }

    /// Emit one event per recognized bit in `flags`.
    ///
    /// Bits without an event are ignored. Returns the number of events emitted.
    pub fn on_state_changed(&self, stack: &dyn Stack, flags: ChangedFlags) -> usize {
        debug!("EventTranslator: state changed flags={:#x}", flags);
        let mut emitted = 0;
        for (flag, kind) in CHANGE_EVENTS {
            if flags.contains(flag) {
                self.emitter.emit(Self::current_event(stack, kind));
                emitted += 1;
            }
        }
        emitted
    }

    /// Emit the current value for `kind`, whether or not it changed.
    pub fn request_event(&self, stack: &dyn Stack, kind: EventKind) {
        self.emitter.emit(Self::current_event(stack, kind));
    }

    /// [`request_event`](Self::request_event) by numeric id.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a recognized event id. Callers holding untrusted
    /// ids should convert with `EventKind::try_from` first.
    pub fn request_event_id(&self, stack: &dyn Stack, id: u8) {
        match EventKind::try_from(id) {
            Ok(kind) => self.request_event(stack, kind),
            Err(e) => panic!("{}", e),
        }
    }

    /// Read the value for `kind` from the stack.
    pub fn current_event(stack: &dyn Stack, kind: EventKind) -> AgentEvent {
        match kind {
            EventKind::NetworkName => AgentEvent::NetworkName(stack.network_name()),
            EventKind::ExtPanId => AgentEvent::ExtPanId(stack.extended_pan_id()),
            EventKind::ThreadState => AgentEvent::ThreadState(stack.device_role().is_attached()),
            EventKind::Pskc => AgentEvent::Pskc(stack.pskc()),
            EventKind::ThreadVersion => AgentEvent::ThreadVersion(stack.thread_version()),
        }
    }
}

#[cfg(test)]
#[path = "translator_tests.rs"]
mod tests;
