//! Agent 间消息
//!
//! 消息只追加不修改；一次协作任务对应一个 MessageLog，结束时整体快照进结果。

use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 广播消息的接收方
pub const BROADCAST: &str = "*";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Request,
    Response,
    Broadcast,
    Delegation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentMessage {
    pub from: String,
    pub to: String,
    pub kind: MessageKind,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    pub timestamp: i64,
}

impl AgentMessage {
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        kind: MessageKind,
        content: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            kind,
            content: content.into(),
            payload: None,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

#[derive(Debug, Default)]
pub struct MessageLog {
    messages: Mutex<Vec<AgentMessage>>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn send(&self, message: AgentMessage) {
        tracing::debug!(
            from = %message.from,
            to = %message.to,
            kind = ?message.kind,
            "agent message"
        );
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(message);
    }

    pub fn broadcast(&self, from: impl Into<String>, content: impl Into<String>) {
        self.send(AgentMessage::new(from, BROADCAST, MessageKind::Broadcast, content));
    }

    pub fn len(&self) -> usize {
        self.messages.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> Vec<AgentMessage> {
        self.messages.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}
