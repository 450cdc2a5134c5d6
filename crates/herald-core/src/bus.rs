//! In-process fan-out of host events.
//!
//! Hosts publish [`HostEvent`]s as they happen; the tick loop listens for
//! full-update requests and the urgent-notification task listens for
//! sickness. Each subscriber gets its own receiver, so a slow consumer
//! never blocks the publisher.

use herald_types::HostEvent;
use tokio::sync::broadcast;

/// Capacity of the host event channel.
///
/// A subscriber that falls behind by more than this many events receives
/// [`broadcast::error::RecvError::Lagged`] and skips ahead.
pub const BUS_CAPACITY: usize = 256;

/// Broadcast channel for host events.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<HostEvent>,
}

impl EventBus {
    /// Create a bus with [`BUS_CAPACITY`] slots.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(BUS_CAPACITY);
        Self { sender }
    }

    /// Publish an event to every current subscriber.
    ///
    /// Returns the number of subscribers that received it. Publishing with
    /// no subscribers is not an error; the event is simply dropped.
    pub fn publish(&self, event: HostEvent) -> usize {
        match self.sender.send(event) {
            Ok(receivers) => receivers,
            Err(broadcast::error::SendError(dropped)) => {
                tracing::trace!(event = ?dropped, "host event dropped, no subscribers");
                0
            }
        }
    }

    /// Subscribe to events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<HostEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn every_subscriber_sees_the_event() {
        let bus = EventBus::new();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        assert_eq!(bus.publish(HostEvent::FullUpdateRequested), 2);
        assert_eq!(first.recv().await.unwrap(), HostEvent::FullUpdateRequested);
        assert_eq!(second.recv().await.unwrap(), HostEvent::FullUpdateRequested);
    }

    #[test]
    fn publishing_without_subscribers_is_harmless() {
        let bus = EventBus::new();
        assert_eq!(bus.publish(HostEvent::FullUpdateRequested), 0);
    }
}
