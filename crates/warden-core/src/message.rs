//! Inbound/outbound message value types shared across the runtime.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

fn now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// A message arriving from a channel adapter, destined for the agent loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub channel: String,
    pub sender_id: String,
    pub chat_id: String,
    pub content: String,
    #[serde(default = "now_secs")]
    pub timestamp: f64,
    #[serde(default)]
    pub media: Vec<String>,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

impl InboundMessage {
    pub fn new(
        channel: impl Into<String>,
        sender_id: impl Into<String>,
        chat_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            channel: channel.into(),
            sender_id: sender_id.into(),
            chat_id: chat_id.into(),
            content: content.into(),
            timestamp: now_secs(),
            media: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    /// `"{channel}:{chat_id}"`, the session this message belongs to.
    pub fn session_key(&self) -> String {
        format!("{}:{}", self.channel, self.chat_id)
    }
}

/// A message produced by the agent, destined for an outbound channel adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub channel: String,
    pub chat_id: String,
    pub content: String,
    #[serde(default)]
    pub reply_to: Option<String>,
    #[serde(default)]
    pub media: Vec<String>,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

impl OutboundMessage {
    pub fn new(channel: impl Into<String>, chat_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            chat_id: chat_id.into(),
            content: content.into(),
            reply_to: None,
            media: Vec::new(),
            metadata: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_key_combines_channel_and_chat() {
        let msg = InboundMessage::new("whatsapp", "user1", "chat1", "test");
        assert_eq!(msg.session_key(), "whatsapp:chat1");
    }

    #[test]
    fn timestamp_defaults_to_now() {
        let msg = InboundMessage::new("telegram", "u1", "c1", "test");
        assert!(msg.timestamp > 0.0);
    }

    #[test]
    fn custom_timestamp_is_preserved() {
        let mut msg = InboundMessage::new("telegram", "u1", "c1", "test");
        msg.timestamp = 1_234_567_890.0;
        assert_eq!(msg.timestamp, 1_234_567_890.0);
    }

    #[test]
    fn outbound_reply_to_defaults_to_none() {
        let msg = OutboundMessage::new("telegram", "c", "hi");
        assert_eq!(msg.reply_to, None);
    }
}
