//! Simulated NCP.
//!
//! A [`StackPlatform`] that needs no radio. The node keeps a commissioned
//! dataset, runs a tasklet queue, and after a resume walks through
//! detached, child and router on the injected clock. A [`SimHandle`] lets
//! callers observe lifecycle counters and inject faults.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::debug;

use crate::clock::Clock;
use crate::config::RadioConfig;
use crate::context::{MainloopContext, ReadySet};
use crate::error::StackError;
use crate::event::{ExtPanId, Pskc, ThreadVersion};
use crate::log_bridge::{StackLogLevel, log_stack_line};
use crate::reset::ResetRequester;
use crate::stack::{ChangedFlags, DeviceRole, Stack, StackPlatform, StateChangedCallback};

/// Simulated node parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    pub network_name: String,
    pub ext_pan_id: ExtPanId,
    pub pskc: Pskc,
    pub thread_version: ThreadVersion,
    /// Time between attach steps, before the radio speed-up factor.
    pub attach_delay: Duration,
    /// Whether an active dataset is commissioned.
    pub dataset: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            network_name: "OpenThread".to_string(),
            ext_pan_id: ExtPanId([0xde, 0xad, 0x00, 0xbe, 0xef, 0x00, 0xca, 0xfe]),
            pskc: Pskc([
                0xc2, 0x3a, 0x76, 0xe9, 0x8f, 0x1a, 0x64, 0x83, 0x63, 0x9b, 0x1a, 0xc1, 0x27, 0x1e,
                0x2e, 0x27,
            ]),
            thread_version: ThreadVersion(4),
            attach_delay: Duration::from_secs(1),
            dataset: true,
        }
    }
}

struct SimNode {
    role: DeviceRole,
    tasklets: VecDeque<ChangedFlags>,
    callback: Option<StateChangedCallback>,
    next_transition: Option<(Instant, DeviceRole)>,
    attach_delay: Duration,
    log_level: Option<StackLogLevel>,
}

impl SimNode {
    fn post(&mut self, flags: ChangedFlags) {
        self.tasklets.push_back(flags);
    }

    fn set_role(&mut self, role: DeviceRole) {
        if self.role == role {
            return;
        }
        log_stack_line(
            StackLogLevel::Note as u8,
            "mle",
            &format!("Role {} -> {}", self.role, role),
        );
        self.role = role;
        self.post(ChangedFlags::ROLE);
    }
}

#[derive(Default)]
struct SimShared {
    /// Dataset and identity. Survives resets.
    persisted: SimConfig,
    node: Option<SimNode>,
    platform_bound: bool,
    inits: u64,
    finalizes: u64,
    deinits: u64,
    fail_next_init: Option<StackError>,
    reject_callback: Option<StackError>,
    fail_next_resume: Option<StackError>,
    reset: Option<ResetRequester>,
}

/// Platform that creates simulated stack instances.
pub struct SimulatedPlatform {
    shared: Arc<Mutex<SimShared>>,
    clock: Arc<dyn Clock>,
}

impl SimulatedPlatform {
    pub fn new(config: SimConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            shared: Arc::new(Mutex::new(SimShared {
                persisted: config,
                ..SimShared::default()
            })),
            clock,
        }
    }

    /// Observation and fault injection handle.
    pub fn handle(&self) -> SimHandle {
        SimHandle {
            shared: self.shared.clone(),
        }
    }
}

impl StackPlatform for SimulatedPlatform {
    fn init(
        &mut self,
        radio: &RadioConfig,
        reset: ResetRequester,
    ) -> Result<Box<dyn Stack>, StackError> {
        let mut shared = self.shared.lock();
        if let Some(err) = shared.fail_next_init.take() {
            return Err(err);
        }
        if shared.node.is_some() {
            return Err(StackError::InvalidState(
                "stack instance already initialized".to_string(),
            ));
        }

        shared.inits += 1;
        shared.platform_bound = true;
        shared.reset = Some(reset);

        let mut node = SimNode {
            role: DeviceRole::Disabled,
            tasklets: VecDeque::new(),
            callback: None,
            next_transition: None,
            attach_delay: shared.persisted.attach_delay / radio.speed_up_factor.max(1),
            log_level: None,
        };
        if shared.persisted.dataset {
            node.post(ChangedFlags::NETWORK_NAME | ChangedFlags::EXT_PANID);
        }
        shared.node = Some(node);

        debug!(
            interface = %radio.interface_name,
            instance = shared.inits,
            "Simulated NCP instance created"
        );
        drop(shared);

        Ok(Box::new(SimStack {
            shared: self.shared.clone(),
            clock: self.clock.clone(),
        }))
    }

    fn deinit(&mut self) {
        let mut shared = self.shared.lock();
        shared.deinits += 1;
        shared.platform_bound = false;
        shared.reset = None;
    }
}

struct SimStack {
    shared: Arc<Mutex<SimShared>>,
    clock: Arc<dyn Clock>,
}

impl SimStack {
    fn with_node<R>(&self, f: impl FnOnce(&mut SimNode, &SimConfig) -> R) -> Option<R> {
        let mut shared = self.shared.lock();
        let SimShared {
            node, persisted, ..
        } = &mut *shared;
        node.as_mut().map(|node| f(node, persisted))
    }
}

impl Stack for SimStack {
    fn has_pending_work(&self) -> bool {
        self.with_node(|node, _| !node.tasklets.is_empty())
            .unwrap_or(false)
    }

    fn process_pending_work(&mut self) {
        // Tasklets posted while running wait for the next call.
        let Some((batch, mut callback)) = self.with_node(|node, _| {
            let batch: Vec<ChangedFlags> = node.tasklets.drain(..).collect();
            (batch, node.callback.take())
        }) else {
            return;
        };

        if let Some(callback) = callback.as_mut() {
            for flags in batch {
                callback(flags);
            }
        }

        self.with_node(|node, _| {
            if node.callback.is_none() {
                node.callback = callback;
            }
        });
    }

    fn update(&mut self, context: &mut MainloopContext) {
        let now = self.clock.now();
        self.with_node(|node, _| {
            if let Some((at, _)) = node.next_transition {
                context.shrink_timeout(at.saturating_duration_since(now));
            }
        });
    }

    fn process(&mut self, _ready: &ReadySet) {
        let now = self.clock.now();
        self.with_node(|node, _| {
            while let Some((at, role)) = node.next_transition {
                if at > now {
                    break;
                }
                node.set_role(role);
                node.next_transition = match role {
                    DeviceRole::Detached => Some((at + node.attach_delay, DeviceRole::Child)),
                    DeviceRole::Child => Some((at + node.attach_delay, DeviceRole::Router)),
                    _ => None,
                };
            }
        });
    }

    fn device_role(&self) -> DeviceRole {
        self.with_node(|node, _| node.role)
            .unwrap_or(DeviceRole::Disabled)
    }

    fn network_name(&self) -> String {
        self.with_node(|_, persisted| persisted.network_name.clone())
            .unwrap_or_default()
    }

    fn extended_pan_id(&self) -> ExtPanId {
        self.with_node(|_, persisted| persisted.ext_pan_id)
            .unwrap_or_default()
    }

    fn pskc(&self) -> Pskc {
        self.with_node(|_, persisted| persisted.pskc)
            .unwrap_or_default()
    }

    fn thread_version(&self) -> ThreadVersion {
        self.with_node(|_, persisted| persisted.thread_version)
            .unwrap_or(ThreadVersion(0))
    }

    fn set_state_changed_callback(
        &mut self,
        callback: StateChangedCallback,
    ) -> Result<(), StackError> {
        let mut shared = self.shared.lock();
        if let Some(err) = shared.reject_callback.take() {
            return Err(err);
        }
        let node = shared
            .node
            .as_mut()
            .ok_or_else(|| StackError::InvalidState("no stack instance".to_string()))?;
        if node.callback.is_some() {
            return Err(StackError::Already("state changed callback".to_string()));
        }
        node.callback = Some(callback);
        Ok(())
    }

    fn set_log_level(&mut self, level: StackLogLevel) -> Result<(), StackError> {
        self.with_node(|node, _| node.log_level = Some(level))
            .ok_or_else(|| StackError::InvalidState("no stack instance".to_string()))
    }

    /// Succeeds without doing anything when there is no dataset or the
    /// interface is already up.
    fn try_resume_network(&mut self) -> Result<(), StackError> {
        let now = self.clock.now();
        let mut shared = self.shared.lock();
        if let Some(err) = shared.fail_next_resume.take() {
            return Err(err);
        }
        let SimShared {
            node, persisted, ..
        } = &mut *shared;
        let node = node
            .as_mut()
            .ok_or_else(|| StackError::InvalidState("no stack instance".to_string()))?;

        if !persisted.dataset {
            debug!("Simulated NCP: no active dataset, nothing to resume");
            return Ok(());
        }
        if node.role != DeviceRole::Disabled {
            debug!(role = %node.role, "Simulated NCP: interface already up");
            return Ok(());
        }
        node.set_role(DeviceRole::Detached);
        node.next_transition = Some((now + node.attach_delay, DeviceRole::Child));
        Ok(())
    }

    fn finalize(self: Box<Self>) {
        let mut shared = self.shared.lock();
        shared.finalizes += 1;
        shared.node = None;
        debug!(finalizes = shared.finalizes, "Simulated NCP instance finalized");
    }
}

/// Observation and fault injection for a [`SimulatedPlatform`].
#[derive(Clone)]
pub struct SimHandle {
    shared: Arc<Mutex<SimShared>>,
}

impl SimHandle {
    /// Successful platform inits.
    pub fn inits(&self) -> u64 {
        self.shared.lock().inits
    }

    /// Stack instances finalized.
    pub fn finalizes(&self) -> u64 {
        self.shared.lock().finalizes
    }

    /// Platform deinit calls.
    pub fn deinits(&self) -> u64 {
        self.shared.lock().deinits
    }

    /// Check if a stack instance is currently live.
    pub fn is_live(&self) -> bool {
        self.shared.lock().node.is_some()
    }

    pub fn is_platform_bound(&self) -> bool {
        self.shared.lock().platform_bound
    }

    /// Make the next platform init fail with `err`.
    pub fn fail_next_init(&self, err: StackError) {
        self.shared.lock().fail_next_init = Some(err);
    }

    /// Make the next callback registration fail with `err`.
    pub fn reject_state_callback(&self, err: StackError) {
        self.shared.lock().reject_callback = Some(err);
    }

    /// Make the next network resume fail with `err`.
    pub fn fail_next_resume(&self, err: StackError) {
        self.shared.lock().fail_next_resume = Some(err);
    }

    /// Raise a reset the way the platform does after a radio failure.
    ///
    /// Returns false if the platform is not bound.
    pub fn platform_reset(&self) -> bool {
        match self.shared.lock().reset.as_ref() {
            Some(reset) => {
                reset.request();
                true
            }
            None => false,
        }
    }

    /// Change the network name and notify through a tasklet.
    pub fn set_network_name(&self, name: impl Into<String>) {
        let mut shared = self.shared.lock();
        shared.persisted.network_name = name.into();
        if let Some(node) = shared.node.as_mut() {
            node.post(ChangedFlags::NETWORK_NAME);
        }
    }

    /// Force the device role and notify through a tasklet.
    pub fn set_role(&self, role: DeviceRole) {
        if let Some(node) = self.shared.lock().node.as_mut() {
            node.next_transition = None;
            node.set_role(role);
        }
    }

    /// Queue a tasklet that raises `flags`.
    pub fn post_tasklet(&self, flags: ChangedFlags) {
        if let Some(node) = self.shared.lock().node.as_mut() {
            node.post(flags);
        }
    }

    /// Role of the live instance.
    pub fn role(&self) -> Option<DeviceRole> {
        self.shared.lock().node.as_ref().map(|node| node.role)
    }

    /// Log level applied to the live instance.
    pub fn log_level(&self) -> Option<StackLogLevel> {
        self.shared
            .lock()
            .node
            .as_ref()
            .and_then(|node| node.log_level)
    }

    /// Queued tasklets on the live instance.
    pub fn pending_tasklets(&self) -> usize {
        self.shared
            .lock()
            .node
            .as_ref()
            .map_or(0, |node| node.tasklets.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::reset::ResetController;

    fn platform() -> (SimulatedPlatform, ManualClock) {
        let clock = ManualClock::new();
        let platform = SimulatedPlatform::new(SimConfig::default(), Arc::new(clock.clone()));
        (platform, clock)
    }

    #[test]
    fn test_init_posts_dataset_notification() {
        let (mut platform, _clock) = platform();
        let handle = platform.handle();
        let controller = ResetController::new();

        let stack = platform
            .init(&RadioConfig::default(), controller.requester())
            .unwrap();

        assert!(stack.has_pending_work());
        assert_eq!(handle.pending_tasklets(), 1);
        assert_eq!(stack.device_role(), DeviceRole::Disabled);
        assert_eq!(stack.network_name(), "OpenThread");
        assert_eq!(handle.inits(), 1);
    }

    #[test]
    fn test_second_live_instance_rejected() {
        let (mut platform, _clock) = platform();
        let controller = ResetController::new();
        let _stack = platform
            .init(&RadioConfig::default(), controller.requester())
            .unwrap();

        let second = platform.init(&RadioConfig::default(), controller.requester());
        assert!(matches!(second, Err(StackError::InvalidState(_))));
    }

    #[test]
    fn test_tasklets_posted_during_drain_wait() {
        let (mut platform, _clock) = platform();
        let handle = platform.handle();
        let controller = ResetController::new();
        let mut stack = platform
            .init(&RadioConfig::default(), controller.requester())
            .unwrap();

        let reposter = handle.clone();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        stack
            .set_state_changed_callback(Box::new(move |flags| {
                seen_clone.lock().push(flags);
                reposter.post_tasklet(ChangedFlags::CHANNEL);
            }))
            .unwrap();

        stack.process_pending_work();
        assert_eq!(
            *seen.lock(),
            vec![ChangedFlags::NETWORK_NAME | ChangedFlags::EXT_PANID]
        );
        assert!(stack.has_pending_work());

        stack.process_pending_work();
        assert_eq!(seen.lock().len(), 2);
        assert_eq!(seen.lock()[1], ChangedFlags::CHANNEL);
    }

    #[test]
    fn test_attach_progression() {
        let (mut platform, clock) = platform();
        let handle = platform.handle();
        let controller = ResetController::new();
        let mut stack = platform
            .init(&RadioConfig::default(), controller.requester())
            .unwrap();

        stack.try_resume_network().unwrap();
        assert_eq!(handle.role(), Some(DeviceRole::Detached));

        let mut ctx = MainloopContext::new(Duration::from_secs(10));
        stack.update(&mut ctx);
        assert_eq!(ctx.timeout, Duration::from_secs(1));

        clock.advance(Duration::from_secs(1));
        stack.process(&ReadySet::new());
        assert_eq!(stack.device_role(), DeviceRole::Child);

        clock.advance(Duration::from_secs(5));
        stack.process(&ReadySet::new());
        assert_eq!(stack.device_role(), DeviceRole::Router);
        assert!(stack.device_role().is_attached());
    }

    #[test]
    fn test_speed_up_factor_shortens_attach() {
        let (mut platform, _clock) = platform();
        let controller = ResetController::new();
        let radio = RadioConfig {
            speed_up_factor: 4,
            ..RadioConfig::default()
        };
        let mut stack = platform.init(&radio, controller.requester()).unwrap();
        stack.try_resume_network().unwrap();

        let mut ctx = MainloopContext::new(Duration::from_secs(10));
        stack.update(&mut ctx);
        assert_eq!(ctx.timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_resume_without_dataset_is_a_no_op() {
        let clock = ManualClock::new();
        let config = SimConfig {
            dataset: false,
            ..SimConfig::default()
        };
        let mut platform = SimulatedPlatform::new(config, Arc::new(clock));
        let controller = ResetController::new();
        let mut stack = platform
            .init(&RadioConfig::default(), controller.requester())
            .unwrap();

        assert!(!stack.has_pending_work());
        stack.try_resume_network().unwrap();
        assert_eq!(stack.device_role(), DeviceRole::Disabled);
        assert!(!stack.has_pending_work());
    }

    #[test]
    fn test_resume_when_up_succeeds_without_change() {
        let (mut platform, _clock) = platform();
        let handle = platform.handle();
        let controller = ResetController::new();
        let mut stack = platform
            .init(&RadioConfig::default(), controller.requester())
            .unwrap();

        stack.try_resume_network().unwrap();
        let queued = handle.pending_tasklets();
        stack.try_resume_network().unwrap();

        assert_eq!(handle.role(), Some(DeviceRole::Detached));
        assert_eq!(handle.pending_tasklets(), queued);
    }

    #[test]
    fn test_injected_resume_failure_is_one_shot() {
        let (mut platform, _clock) = platform();
        let handle = platform.handle();
        let controller = ResetController::new();
        let mut stack = platform
            .init(&RadioConfig::default(), controller.requester())
            .unwrap();

        handle.fail_next_resume(StackError::Platform("radio busy".into()));
        assert!(matches!(
            stack.try_resume_network(),
            Err(StackError::Platform(_))
        ));
        assert_eq!(handle.role(), Some(DeviceRole::Disabled));

        stack.try_resume_network().unwrap();
        assert_eq!(handle.role(), Some(DeviceRole::Detached));
    }

    #[test]
    fn test_finalize_and_deinit_counters() {
        let (mut platform, _clock) = platform();
        let handle = platform.handle();
        let controller = ResetController::new();
        let stack = platform
            .init(&RadioConfig::default(), controller.requester())
            .unwrap();

        stack.finalize();
        platform.deinit();

        assert_eq!(handle.finalizes(), 1);
        assert_eq!(handle.deinits(), 1);
        assert!(!handle.is_live());
        assert!(!handle.is_platform_bound());
        assert!(!handle.platform_reset());
    }

    #[test]
    fn test_platform_reset_raises_request() {
        let (mut platform, _clock) = platform();
        let handle = platform.handle();
        let controller = ResetController::new();
        let _stack = platform
            .init(&RadioConfig::default(), controller.requester())
            .unwrap();

        assert!(handle.platform_reset());
        assert!(controller.is_reset_requested());
    }

    #[test]
    fn test_callback_registered_once() {
        let (mut platform, _clock) = platform();
        let controller = ResetController::new();
        let mut stack = platform
            .init(&RadioConfig::default(), controller.requester())
            .unwrap();

        stack.set_state_changed_callback(Box::new(|_| {})).unwrap();
        assert!(matches!(
            stack.set_state_changed_callback(Box::new(|_| {})),
            Err(StackError::Already(_))
        ));
    }
}
