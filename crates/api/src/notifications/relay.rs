//! Relays completion events from the event bus to a delivery sink.
//!
//! Delivery itself (push, email, in-app) belongs to another service; the
//! relay only decides which events are user-facing and forwards them.

use std::sync::Arc;

use async_trait::async_trait;
use backlog_events::{PlatformEvent, LOCK_COMPLETED, MEDIA_ITEM_COMPLETED};
use tokio::sync::broadcast;

/// Error returned by a sink; logged and otherwise ignored.
pub type SinkError = Box<dyn std::error::Error + Send + Sync>;

/// Destination for user-facing notifications.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, event: &PlatformEvent) -> Result<(), SinkError>;
}

/// Default sink: writes each notification to the log.
pub struct TracingSink;

#[async_trait]
impl NotificationSink for TracingSink {
    async fn deliver(&self, event: &PlatformEvent) -> Result<(), SinkError> {
        tracing::info!(
            event_type = %event.event_type,
            user_id = ?event.actor_user_id,
            entity_id = ?event.source_entity_id,
            payload = %event.payload,
            "Notification"
        );
        Ok(())
    }
}

/// Forwards completion events to a [`NotificationSink`].
pub struct NotificationRelay {
    sink: Arc<dyn NotificationSink>,
}

impl NotificationRelay {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }

    /// Whether an event type is forwarded to users.
    pub fn is_user_facing(event_type: &str) -> bool {
        matches!(event_type, LOCK_COMPLETED | MEDIA_ITEM_COMPLETED)
    }

    /// Run the relay loop until the [`EventBus`](backlog_events::EventBus)
    /// is dropped.
    pub async fn run(self, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) if Self::is_user_facing(&event.event_type) => {
                    if let Err(e) = self.sink.deliver(&event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            "Failed to deliver notification"
                        );
                    }
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification relay lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification relay shutting down");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use backlog_events::EventBus;

    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        delivered: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl NotificationSink for RecordingSink {
        async fn deliver(&self, event: &PlatformEvent) -> Result<(), SinkError> {
            self.delivered
                .lock()
                .expect("sink mutex poisoned")
                .push(event.event_type.clone());
            Ok(())
        }
    }

    struct FailingSink;

    #[async_trait]
    impl NotificationSink for FailingSink {
        async fn deliver(&self, _event: &PlatformEvent) -> Result<(), SinkError> {
            Err("sink offline".into())
        }
    }

    #[tokio::test]
    async fn forwards_only_user_facing_events() {
        let bus = EventBus::default();
        let sink = Arc::new(RecordingSink::default());
        let relay = NotificationRelay::new(Arc::clone(&sink) as Arc<dyn NotificationSink>);
        let handle = tokio::spawn(relay.run(bus.subscribe()));

        bus.publish(PlatformEvent::new(LOCK_COMPLETED).with_source("lock", 1));
        bus.publish(PlatformEvent::new("queue.reordered"));
        bus.publish(PlatformEvent::new(MEDIA_ITEM_COMPLETED).with_source("media_item", 2));
        drop(bus);

        handle.await.expect("relay task should finish");
        let delivered = sink.delivered.lock().unwrap().clone();
        assert_eq!(delivered, vec![LOCK_COMPLETED, MEDIA_ITEM_COMPLETED]);
    }

    #[tokio::test]
    async fn sink_errors_do_not_stop_the_relay() {
        let bus = EventBus::default();
        let relay = NotificationRelay::new(Arc::new(FailingSink));
        let handle = tokio::spawn(relay.run(bus.subscribe()));

        bus.publish(PlatformEvent::new(LOCK_COMPLETED));
        bus.publish(PlatformEvent::new(LOCK_COMPLETED));
        drop(bus);

        handle.await.expect("relay keeps running until the bus closes");
    }
}
