//! # Broadcast bus for runtime events.
//!
//! [`Bus`] wraps [`tokio::sync::broadcast`] so the watcher, the refresh
//! engine, and the fan-out workers can publish [`Event`]s without knowing
//! who listens. Publishing never blocks: if nobody subscribed, the event
//! is dropped; if a subscriber lags behind the channel capacity, that
//! subscriber loses the oldest events (standard broadcast semantics).
//!
//! Readings never travel over the bus. They are delivered through the
//! fan-out's per-consumer queues; the bus carries telemetry only.

use tokio::sync::broadcast;

use crate::events::event::Event;

/// Event bus with fixed capacity.
///
/// Cloning is cheap; all clones publish into the same channel.
#[derive(Debug, Clone)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a bus with the given capacity (clamped to at least 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all current subscribers.
    ///
    /// Fire-and-forget: errors (no subscribers) are ignored.
    pub fn publish(&self, event: Event) {
        let _ = self.tx.send(event);
    }

    /// Creates a new subscription receiving events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::event::EventKind;

    #[tokio::test]
    async fn publish_reaches_subscriber() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();

        bus.publish(Event::new(EventKind::CycleStarting).with_venue("spot"));

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::CycleStarting);
        assert_eq!(ev.venue.as_deref(), Some("spot"));
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_noop() {
        let bus = Bus::new(1);
        // No receiver; must not panic or block.
        bus.publish(Event::new(EventKind::ShutdownRequested));
    }

    #[test]
    fn capacity_is_clamped_to_one() {
        // Would panic inside broadcast::channel with 0.
        let _ = Bus::new(0);
    }
}
