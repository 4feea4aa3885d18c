//! Event emission channel and built-in subscribers.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::event::AgentEvent;

/// Receives events synchronously on the mainloop thread.
pub trait EventSubscriber: Send + Sync {
    /// Called once per emitted event.
    fn on_event(&self, event: &AgentEvent);
}

impl<F> EventSubscriber for F
where
    F: Fn(&AgentEvent) + Send + Sync,
{
    fn on_event(&self, event: &AgentEvent) {
        self(event)
    }
}

#[derive(Clone)]
struct SubscriberHandle {
    id: String,
    subscriber: Arc<dyn EventSubscriber>,
}

/// Fan-out of events to registered subscribers.
///
/// Subscribers are called in registration order. Delivery is at most once;
/// nothing is buffered for subscribers registered later.
#[derive(Clone, Default)]
pub struct EventEmitter {
    subscribers: Arc<RwLock<Vec<SubscriberHandle>>>,
}

impl EventEmitter {
    /// Create an emitter with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber under `id`.
    pub fn subscribe(&self, id: impl Into<String>, subscriber: Arc<dyn EventSubscriber>) {
        let id = id.into();
        debug!("Event subscriber registered: {}", id);
        self.subscribers
            .write()
            .push(SubscriberHandle { id, subscriber });
    }

    /// Remove a subscriber by id. Returns whether one was removed.
    pub fn unsubscribe(&self, id: &str) -> bool {
        let mut subscribers = self.subscribers.write();
        let before = subscribers.len();
        subscribers.retain(|h| h.id != id);
        before != subscribers.len()
    }

    /// Number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Deliver `event` to every subscriber.
    pub fn emit(&self, event: AgentEvent) {
        // Snapshot so subscribers may (un)subscribe while being called.
        let subscribers = self.subscribers.read().clone();
        for handle in &subscribers {
            handle.subscriber.on_event(&event);
        }
    }
}

/// Logs every event at info level.
#[derive(Debug, Default)]
pub struct LoggingSubscriber;

impl EventSubscriber for LoggingSubscriber {
    fn on_event(&self, event: &AgentEvent) {
        info!(kind = %event.kind(), "Event: {}", event);
    }
}

/// Keeps a copy of every event, mostly for tests and diagnostics.
#[derive(Debug, Default)]
pub struct RecordingSubscriber {
    events: Mutex<Vec<AgentEvent>>,
}

impl RecordingSubscriber {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Events received so far.
    pub fn events(&self) -> Vec<AgentEvent> {
        self.events.lock().clone()
    }

    /// Drain the recorded events.
    pub fn take(&self) -> Vec<AgentEvent> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl EventSubscriber for RecordingSubscriber {
    fn on_event(&self, event: &AgentEvent) {
        self.events.lock().push(event.clone());
    }
}

/// Forwards events to async consumers over a tokio broadcast channel.
pub struct BroadcastSubscriber {
    sender: broadcast::Sender<AgentEvent>,
}

impl BroadcastSubscriber {
    /// Create a bridge buffering up to `capacity` events per receiver.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Open a new receiver. It sees events emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<AgentEvent> {
        self.sender.subscribe()
    }
}

impl EventSubscriber for BroadcastSubscriber {
    fn on_event(&self, event: &AgentEvent) {
        // No receivers is not an error.
        let _ = self.sender.send(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;

    #[test]
    fn test_emit_in_registration_order() {
        let emitter = EventEmitter::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for name in ["first", "second"] {
            let order = order.clone();
            emitter.subscribe(
                name,
                Arc::new(move |_: &AgentEvent| order.lock().push(name)),
            );
        }

        emitter.emit(AgentEvent::ThreadState(true));
        assert_eq!(*order.lock(), vec!["first", "second"]);
    }

    #[test]
    fn test_unsubscribe() {
        let emitter = EventEmitter::new();
        let recorder = RecordingSubscriber::new();
        emitter.subscribe("rec", recorder.clone());

        assert!(emitter.unsubscribe("rec"));
        assert!(!emitter.unsubscribe("rec"));
        emitter.emit(AgentEvent::ThreadState(false));

        assert_eq!(emitter.subscriber_count(), 0);
        assert!(recorder.events().is_empty());
    }

    #[test]
    fn test_late_subscriber_gets_no_replay() {
        let emitter = EventEmitter::new();
        emitter.emit(AgentEvent::NetworkName("early".into()));

        let recorder = RecordingSubscriber::new();
        emitter.subscribe("rec", recorder.clone());
        emitter.emit(AgentEvent::NetworkName("late".into()));

        assert_eq!(recorder.take(), vec![AgentEvent::NetworkName("late".into())]);
        assert!(recorder.events().is_empty());
    }

    #[test]
    fn test_subscriber_may_subscribe_during_delivery() {
        let emitter = EventEmitter::new();
        let inner = emitter.clone();
        emitter.subscribe(
            "spawner",
            Arc::new(move |_: &AgentEvent| {
                inner.subscribe("spawned", Arc::new(LoggingSubscriber));
            }),
        );

        emitter.emit(AgentEvent::ThreadState(true));
        assert_eq!(emitter.subscriber_count(), 2);
    }

    #[tokio::test]
    async fn test_broadcast_bridge() {
        let emitter = EventEmitter::new();
        let bridge = Arc::new(BroadcastSubscriber::new(8));
        let mut rx = bridge.subscribe();
        emitter.subscribe("broadcast", bridge.clone());

        emitter.emit(AgentEvent::NetworkName("OpenThread".into()));
        emitter.emit(AgentEvent::ThreadState(true));

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.kind(), EventKind::NetworkName);
        assert_eq!(second, AgentEvent::ThreadState(true));
    }

    #[test]
    fn test_broadcast_without_receivers() {
        let bridge = BroadcastSubscriber::new(4);
        bridge.on_event(&AgentEvent::ThreadState(false));
    }
}
