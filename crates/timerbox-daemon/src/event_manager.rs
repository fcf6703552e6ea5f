//! Central event broadcasting

use tokio::sync::broadcast;

use crate::timer::TimerEvent;

/// Fans timer events out to every subscriber
pub struct EventManager {
    event_tx: broadcast::Sender<TimerEvent>,
}

impl EventManager {
    /// Create a new event manager with a broadcast channel
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(1000);
        Self { event_tx }
    }

    /// Subscribe to all timer events
    pub fn subscribe(&self) -> broadcast::Receiver<TimerEvent> {
        self.event_tx.subscribe()
    }

    /// Emit a timer event. Having no subscribers is not an error.
    pub fn emit(&self, event: TimerEvent) {
        tracing::trace!("EventManager: {:?}", event.event_type);
        let _ = self.event_tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.event_tx.receiver_count()
    }
}

impl Default for EventManager {
    fn default() -> Self {
        Self::new()
    }
}
