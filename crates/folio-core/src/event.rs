//! Event bus for folio using tokio::broadcast
//!
//! The store publishes a [`DataEvent`] after every successful write; the web
//! crate forwards them to dashboards over SSE.

use tokio::sync::broadcast;

/// Events emitted by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataEvent {
    /// A page view (optionally tied to a portfolio item) was recorded
    ViewRecorded { item_id: Option<i64> },
    /// A non-view analytics event was recorded
    EventRecorded { event_type: String },
    /// A contact inquiry was stored
    InquiryReceived(i64),
    /// A portfolio item was created
    ItemCreated(i64),
    /// A category was created
    CategoryCreated(i64),
}

impl DataEvent {
    /// Event name used on the wire
    pub fn name(&self) -> &'static str {
        match self {
            DataEvent::ViewRecorded { .. } => "view_recorded",
            DataEvent::EventRecorded { .. } => "event_recorded",
            DataEvent::InquiryReceived(_) => "inquiry_received",
            DataEvent::ItemCreated(_) => "item_created",
            DataEvent::CategoryCreated(_) => "category_created",
        }
    }
}

/// Event bus for broadcasting data events
///
/// Uses tokio::broadcast for multi-consumer support.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<DataEvent>,
}

impl EventBus {
    /// Create a new event bus with specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Create with default capacity (256 events)
    pub fn default_capacity() -> Self {
        Self::new(256)
    }

    /// Publish an event to all subscribers
    pub fn publish(&self, event: DataEvent) {
        // No subscribers is fine
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DataEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::default_capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_bus_publish_subscribe() {
        let bus = EventBus::default_capacity();
        let mut rx = bus.subscribe();

        bus.publish(DataEvent::ViewRecorded { item_id: Some(4) });
        bus.publish(DataEvent::InquiryReceived(9));

        assert_eq!(
            rx.recv().await.unwrap(),
            DataEvent::ViewRecorded { item_id: Some(4) }
        );
        assert!(matches!(rx.recv().await.unwrap(), DataEvent::InquiryReceived(9)));
    }

    #[tokio::test]
    async fn test_event_bus_multiple_subscribers() {
        let bus = EventBus::default_capacity();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        assert_eq!(bus.subscriber_count(), 2);

        bus.publish(DataEvent::ItemCreated(1));

        assert_eq!(rx1.recv().await.unwrap().name(), "item_created");
        assert_eq!(rx2.recv().await.unwrap().name(), "item_created");
    }

    #[test]
    fn test_event_bus_no_subscribers_ok() {
        let bus = EventBus::default_capacity();
        bus.publish(DataEvent::CategoryCreated(1));
    }
}
