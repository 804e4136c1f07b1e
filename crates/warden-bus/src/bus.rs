use tracing::{debug, info};

use warden_core::{InboundMessage, OutboundMessage};

use crate::error::{BusError, Result};
use crate::queue::Queue;

/// Couples channel adapters to the agent loop via two independent FIFO queues.
///
/// Ordering is strict FIFO within one queue; nothing is guaranteed across the
/// two. Adapters should only ever call `publish_inbound`/`consume_outbound`;
/// the inbound-consume/outbound-publish half belongs to the agent loop.
pub struct MessageBus {
    inbound: Queue<InboundMessage>,
    outbound: Queue<OutboundMessage>,
}

impl MessageBus {
    /// Unbounded queues in both directions.
    pub fn new() -> Self {
        Self::bounded(None, None)
    }

    /// `None` means unbounded for that direction; `Some(n)` applies
    /// backpressure to publishers once `n` messages are buffered.
    pub fn bounded(inbound_capacity: Option<usize>, outbound_capacity: Option<usize>) -> Self {
        Self {
            inbound: Queue::new(inbound_capacity),
            outbound: Queue::new(outbound_capacity),
        }
    }

    pub async fn publish_inbound(&self, msg: InboundMessage) {
        debug!(channel = %msg.channel, session_key = %msg.session_key(), "publishing inbound message");
        self.inbound.publish(msg).await;
    }

    pub async fn consume_inbound(&self) -> Result<InboundMessage> {
        self.inbound.consume().await.ok_or(BusError::Shutdown)
    }

    pub async fn publish_outbound(&self, msg: OutboundMessage) {
        debug!(channel = %msg.channel, chat_id = %msg.chat_id, "publishing outbound message");
        self.outbound.publish(msg).await;
    }

    pub async fn consume_outbound(&self) -> Result<OutboundMessage> {
        self.outbound.consume().await.ok_or(BusError::Shutdown)
    }

    pub fn inbound_size(&self) -> usize {
        self.inbound.size()
    }

    pub fn outbound_size(&self) -> usize {
        self.outbound.size()
    }

    /// Idempotent; never raises. Unblocks any consumer parked on either queue.
    pub async fn stop(&self) {
        info!("message bus stopping");
        self.inbound.close().await;
        self.outbound.close().await;
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    fn msg(content: &str) -> InboundMessage {
        InboundMessage::new("test", "user1", "chat1", content)
    }

    #[tokio::test]
    async fn publish_then_consume_inbound() {
        let bus = MessageBus::new();
        bus.publish_inbound(msg("Hello")).await;
        assert_eq!(bus.inbound_size(), 1);

        let got = bus.consume_inbound().await.unwrap();
        assert_eq!(got.content, "Hello");
        assert_eq!(bus.inbound_size(), 0);
    }

    #[tokio::test]
    async fn multiple_messages_are_fifo() {
        let bus = MessageBus::new();
        for i in 0..5 {
            bus.publish_inbound(msg(&format!("Message {i}"))).await;
        }
        assert_eq!(bus.inbound_size(), 5);

        for i in 0..5 {
            let got = bus.consume_inbound().await.unwrap();
            assert_eq!(got.content, format!("Message {i}"));
        }
        assert_eq!(bus.inbound_size(), 0);
    }

    #[tokio::test]
    async fn consume_blocks_until_publish() {
        let bus = Arc::new(MessageBus::new());
        let bus2 = bus.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            bus2.publish_inbound(msg("Delayed")).await;
        });

        let got = tokio::time::timeout(Duration::from_secs(1), bus.consume_inbound())
            .await
            .expect("should not time out")
            .unwrap();
        assert_eq!(got.content, "Delayed");
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn consume_times_out_when_empty() {
        let bus = MessageBus::new();
        let result = tokio::time::timeout(Duration::from_millis(100), bus.consume_inbound()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn stop_unblocks_pending_consumer() {
        let bus = Arc::new(MessageBus::new());
        let bus2 = bus.clone();
        let handle = tokio::spawn(async move { bus2.consume_inbound().await });

        tokio::time::sleep(Duration::from_millis(20)).await;
        bus.stop().await;

        let result = handle.await.unwrap();
        assert!(matches!(result, Err(BusError::Shutdown)));
    }

    #[tokio::test]
    async fn stop_is_idempotent() {
        let bus = MessageBus::new();
        bus.stop().await;
        bus.stop().await;
    }

    #[tokio::test]
    async fn initial_sizes_are_zero() {
        let bus = MessageBus::new();
        assert_eq!(bus.inbound_size(), 0);
        assert_eq!(bus.outbound_size(), 0);
    }

    #[tokio::test]
    async fn outbound_roundtrip_preserves_fields() {
        let bus = MessageBus::new();
        let mut original = OutboundMessage::new("telegram", "chat456", "Full message");
        original.media.push("https://example.com/img.png".into());
        original
            .metadata
            .insert("key".into(), serde_json::json!("value"));

        bus.publish_outbound(original.clone()).await;
        let got = bus.consume_outbound().await.unwrap();

        assert_eq!(got.channel, original.channel);
        assert_eq!(got.chat_id, original.chat_id);
        assert_eq!(got.content, original.content);
        assert_eq!(got.media, original.media);
        assert_eq!(got.metadata.get("key"), original.metadata.get("key"));
    }

    #[tokio::test]
    async fn bounded_capacity_applies_backpressure() {
        let bus = Arc::new(MessageBus::bounded(Some(1), None));
        bus.publish_inbound(msg("first")).await;

        let bus2 = bus.clone();
        let handle = tokio::spawn(async move {
            bus2.publish_inbound(msg("second")).await;
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!handle.is_finished());

        bus.consume_inbound().await.unwrap();
        handle.await.unwrap();
        assert_eq!(bus.consume_inbound().await.unwrap().content, "second");
    }
}
