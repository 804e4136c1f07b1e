use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

/// One turn of a conversation.
///
/// Modeled as a tagged variant so role-specific fields (`tool_call_id`,
/// `tool_calls`) aren't smuggled through a single untyped map, while still
/// serialising to the flat `{role, content, ...}` shape the session file and
/// the model-facing history both expect.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum ChatTurn {
    System {
        content: String,
        #[serde(flatten)]
        extra: HashMap<String, Value>,
    },
    User {
        content: String,
        #[serde(flatten)]
        extra: HashMap<String, Value>,
    },
    Assistant {
        content: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        tool_calls: Option<Value>,
        #[serde(flatten)]
        extra: HashMap<String, Value>,
    },
    Tool {
        #[serde(rename = "tool_call_id")]
        call_id: String,
        name: String,
        content: String,
        #[serde(flatten)]
        extra: HashMap<String, Value>,
    },
}

impl ChatTurn {
    pub fn role(&self) -> &'static str {
        match self {
            ChatTurn::System { .. } => "system",
            ChatTurn::User { .. } => "user",
            ChatTurn::Assistant { .. } => "assistant",
            ChatTurn::Tool { .. } => "tool",
        }
    }

    pub fn content(&self) -> &str {
        match self {
            ChatTurn::System { content, .. }
            | ChatTurn::User { content, .. }
            | ChatTurn::Assistant { content, .. }
            | ChatTurn::Tool { content, .. } => content,
        }
    }

    /// Build a turn from a free-form role string plus arbitrary extra keys,
    /// as accepted by `Session::add_message`. Unknown roles fall back to a
    /// `User`-shaped turn.
    fn from_role(role: &str, content: String, mut extra: HashMap<String, Value>) -> Self {
        match role {
            "system" => ChatTurn::System { content, extra },
            "assistant" => {
                let tool_calls = extra.remove("tool_calls");
                ChatTurn::Assistant {
                    content,
                    tool_calls,
                    extra,
                }
            }
            "tool" => {
                let call_id = extra
                    .remove("tool_call_id")
                    .and_then(|v| v.as_str().map(str::to_string))
                    .unwrap_or_default();
                let name = extra
                    .remove("name")
                    .and_then(|v| v.as_str().map(str::to_string))
                    .unwrap_or_default();
                ChatTurn::Tool {
                    call_id,
                    name,
                    content,
                    extra,
                }
            }
            // "user" and any other producer-supplied role are stored as User;
            // only the four roles above carry model-contract meaning.
            _ => ChatTurn::User { content, extra },
        }
    }

    /// Projects to the model-contract shape: only `role`, `content`, and
    /// tool-call fields survive.
    pub fn to_history_entry(&self) -> Value {
        match self {
            ChatTurn::System { content, .. } => serde_json::json!({"role": "system", "content": content}),
            ChatTurn::User { content, .. } => serde_json::json!({"role": "user", "content": content}),
            ChatTurn::Assistant { content, tool_calls, .. } => {
                let mut obj = serde_json::json!({"role": "assistant", "content": content});
                if let (Some(map), Some(tc)) = (obj.as_object_mut(), tool_calls) {
                    map.insert("tool_calls".to_string(), tc.clone());
                }
                obj
            }
            ChatTurn::Tool { call_id, name, content, .. } => {
                serde_json::json!({"role": "tool", "tool_call_id": call_id, "name": name, "content": content})
            }
        }
    }
}

/// A persisted conversation session, keyed by `"{channel}:{chat_id}"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub key: String,
    #[serde(default)]
    pub messages: Vec<ChatTurn>,
    #[serde(default = "now_rfc3339")]
    pub created_at: String,
    #[serde(default = "now_rfc3339")]
    pub updated_at: String,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

impl Session {
    pub fn new(key: impl Into<String>) -> Self {
        let now = now_rfc3339();
        Self {
            key: key.into(),
            messages: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
            metadata: HashMap::new(),
        }
    }

    /// Appends `{role, content, timestamp: now, ...extra}` and advances
    /// `updated_at`.
    pub fn add_message(&mut self, role: &str, content: impl Into<String>, extra: HashMap<String, Value>) {
        let mut extra = extra;
        extra
            .entry("timestamp".to_string())
            .or_insert_with(|| Value::String(now_rfc3339()));
        self.messages.push(ChatTurn::from_role(role, content.into(), extra));
        self.touch();
    }

    /// Last `max_messages` turns, projected to the model-contract shape.
    pub fn get_history(&self, max_messages: usize) -> Vec<Value> {
        let start = self.messages.len().saturating_sub(max_messages);
        self.messages[start..].iter().map(ChatTurn::to_history_entry).collect()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = now_rfc3339();
    }
}

/// Replace characters outside `[A-Za-z0-9:_-]` with `_` for use as a file stem.
pub fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == ':' || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_colon_with_underscore() {
        assert_eq!(sanitize_key("telegram:chat1"), "telegram_chat1");
    }

    #[test]
    fn sanitize_leaves_allowed_chars_untouched() {
        assert_eq!(sanitize_key("a-b_c:1"), "a-b_c:1");
    }

    #[test]
    fn sanitize_replaces_path_separators() {
        assert_eq!(sanitize_key("a/b\\c"), "a_b_c");
    }

    #[test]
    fn add_message_advances_updated_at() {
        let mut session = Session::new("t:c");
        let created = session.updated_at.clone();
        std::thread::sleep(std::time::Duration::from_millis(2));
        session.add_message("user", "hi", HashMap::new());
        assert!(session.updated_at >= created);
    }

    #[test]
    fn get_history_strips_non_contract_keys() {
        let mut session = Session::new("t:c");
        let mut extra = HashMap::new();
        extra.insert("custom_field".to_string(), Value::String("value".into()));
        session.add_message("user", "Hello!", extra);

        let history = session.get_history(10);
        assert_eq!(history.len(), 1);
        let obj = history[0].as_object().unwrap();
        assert!(obj.contains_key("role"));
        assert!(obj.contains_key("content"));
        assert!(!obj.contains_key("custom_field"));
        assert!(!obj.contains_key("timestamp"));
    }

    #[test]
    fn get_history_trims_to_last_n() {
        let mut session = Session::new("t:c");
        for i in 0..10 {
            session.add_message("user", format!("Message {i}"), HashMap::new());
        }
        let history = session.get_history(5);
        assert_eq!(history.len(), 5);
        assert_eq!(history[0]["content"], "Message 5");
    }

    #[test]
    fn clear_empties_messages() {
        let mut session = Session::new("t:c");
        session.add_message("user", "Hello!", HashMap::new());
        session.clear();
        assert_eq!(session.messages.len(), 0);
    }
}
