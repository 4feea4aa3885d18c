use super::*;
use crate::context::{MainloopContext, ReadySet};
use crate::emitter::RecordingSubscriber;
use crate::error::StackError;
use crate::event::{ExtPanId, Pskc, ThreadVersion};
use crate::log_bridge::StackLogLevel;
use crate::stack::{DeviceRole, StateChangedCallback};

struct FixedStack {
    role: DeviceRole,
}

impl Stack for FixedStack {
    fn has_pending_work(&self) -> bool {
        false
    }
    fn process_pending_work(&mut self) {}
    fn update(&mut self, _context: &mut MainloopContext) {}
    fn process(&mut self, _ready: &ReadySet) {}
    fn device_role(&self) -> DeviceRole {
        self.role
    }
    fn network_name(&self) -> String {
        "OpenThread".to_string()
    }
    fn extended_pan_id(&self) -> ExtPanId {
        ExtPanId([0xde, 0xad, 0x00, 0xbe, 0xef, 0x00, 0xca, 0xfe])
    }
    fn pskc(&self) -> Pskc {
        Pskc([0x11; 16])
    }
    fn thread_version(&self) -> ThreadVersion {
        ThreadVersion(4)
    }
    fn set_state_changed_callback(&mut self, _cb: StateChangedCallback) -> Result<(), StackError> {
        Ok(())
    }
    fn set_log_level(&mut self, _level: StackLogLevel) -> Result<(), StackError> {
        Ok(())
    }
    fn try_resume_network(&mut self) -> Result<(), StackError> {
        Ok(())
    }
    fn finalize(self: Box<Self>) {}
}

fn setup(role: DeviceRole) -> (EventTranslator, std::sync::Arc<RecordingSubscriber>, FixedStack) {
    let emitter = EventEmitter::new();
    let recorder = RecordingSubscriber::new();
    emitter.subscribe("rec", recorder.clone());
    (EventTranslator::new(emitter), recorder, FixedStack { role })
}

#[test]
fn test_network_name_and_role_flags() {
    let (translator, recorder, stack) = setup(DeviceRole::Router);

    let emitted =
        translator.on_state_changed(&stack, ChangedFlags::NETWORK_NAME | ChangedFlags::ROLE);

    assert_eq!(emitted, 2);
    assert_eq!(
        recorder.events(),
        vec![
            AgentEvent::NetworkName("OpenThread".into()),
            AgentEvent::ThreadState(true),
        ]
    );
}

#[test]
fn test_all_recognized_flags_in_table_order() {
    let (translator, recorder, stack) = setup(DeviceRole::Child);

    translator.on_state_changed(
        &stack,
        ChangedFlags::ROLE | ChangedFlags::EXT_PANID | ChangedFlags::NETWORK_NAME,
    );

    let kinds: Vec<_> = recorder.events().iter().map(AgentEvent::kind).collect();
    assert_eq!(
        kinds,
        vec![EventKind::NetworkName, EventKind::ExtPanId, EventKind::ThreadState]
    );
}

#[test]
fn test_unrecognized_flags_are_ignored() {
    let (translator, recorder, stack) = setup(DeviceRole::Leader);

    let emitted = translator.on_state_changed(
        &stack,
        ChangedFlags::CHANNEL | ChangedFlags::PAN_ID | ChangedFlags::NETWORK_DATA,
    );

    assert_eq!(emitted, 0);
    assert!(recorder.events().is_empty());
}

#[test]
fn test_detached_role_reports_false() {
    let (translator, recorder, stack) = setup(DeviceRole::Detached);
    translator.on_state_changed(&stack, ChangedFlags::ROLE);
    assert_eq!(recorder.events(), vec![AgentEvent::ThreadState(false)]);
}

#[test]
fn test_unknown_role_reports_detached() {
    let (translator, recorder, stack) = setup(DeviceRole::Unknown(42));
    translator.request_event(&stack, EventKind::ThreadState);
    assert_eq!(recorder.events(), vec![AgentEvent::ThreadState(false)]);
}

#[test]
fn test_request_event_emits_current_value() {
    let (translator, recorder, stack) = setup(DeviceRole::Router);

    translator.request_event(&stack, EventKind::Pskc);
    translator.request_event(&stack, EventKind::ThreadVersion);

    assert_eq!(
        recorder.events(),
        vec![
            AgentEvent::Pskc(Pskc([0x11; 16])),
            AgentEvent::ThreadVersion(ThreadVersion(4)),
        ]
    );
}

#[test]
fn test_request_event_repeats() {
    let (translator, recorder, stack) = setup(DeviceRole::Router);
    translator.request_event(&stack, EventKind::NetworkName);
    translator.request_event(&stack, EventKind::NetworkName);
    assert_eq!(recorder.events().len(), 2);
}

#[test]
fn test_request_event_by_id() {
    let (translator, recorder, stack) = setup(DeviceRole::Router);
    translator.request_event_id(&stack, EventKind::ExtPanId.id());
    assert_eq!(recorder.events()[0].kind(), EventKind::ExtPanId);
}

#[test]
#[should_panic(expected = "Unknown event id: 99")]
fn test_request_event_unknown_id_panics() {
    let (translator, _recorder, stack) = setup(DeviceRole::Router);
    translator.request_event_id(&stack, 99);
}
