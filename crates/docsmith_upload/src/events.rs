//! Progress notifications sent back to the host while a tool runs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::info;

/// Event payloads, serialized as `{"type": "...", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ToolEvent {
    Status { description: String, done: bool },
    Message { content: String },
}

impl ToolEvent {
    pub fn status(description: impl Into<String>, done: bool) -> Self {
        Self::Status {
            description: description.into(),
            done,
        }
    }

    pub fn message(content: impl Into<String>) -> Self {
        Self::Message {
            content: content.into(),
        }
    }
}

/// Receives progress events. Emission is fire-and-forget.
#[async_trait]
pub trait EventEmitter: Send + Sync {
    async fn emit(&self, event: ToolEvent);
}

/// Send `event` when an emitter is present; otherwise do nothing.
pub async fn emit(emitter: Option<&dyn EventEmitter>, event: ToolEvent) {
    if let Some(emitter) = emitter {
        emitter.emit(event).await;
    }
}

/// Collects every event in order.
#[derive(Debug, Default)]
pub struct RecordingEmitter {
    events: Mutex<Vec<ToolEvent>>,
}

impl RecordingEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<ToolEvent> {
        self.events.lock().await.clone()
    }
}

#[async_trait]
impl EventEmitter for RecordingEmitter {
    async fn emit(&self, event: ToolEvent) {
        self.events.lock().await.push(event);
    }
}

/// Writes events to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEmitter;

#[async_trait]
impl EventEmitter for TracingEmitter {
    async fn emit(&self, event: ToolEvent) {
        match event {
            ToolEvent::Status { description, done } => info!(done, "{description}"),
            ToolEvent::Message { content } => info!(message = %content, "tool message"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_format() {
        let json = serde_json::to_value(ToolEvent::status("Uploading...", false)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "status",
                "data": {"description": "Uploading...", "done": false}
            })
        );
    }

    #[test]
    fn test_message_wire_format() {
        let json = serde_json::to_value(ToolEvent::message("hi")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "message", "data": {"content": "hi"}})
        );
    }

    #[tokio::test]
    async fn test_recording_emitter_keeps_order() {
        let recorder = RecordingEmitter::new();
        emit(Some(&recorder), ToolEvent::status("a", false)).await;
        emit(Some(&recorder), ToolEvent::status("b", true)).await;
        let events = recorder.events().await;
        assert_eq!(events.len(), 2);
        assert_eq!(events[1], ToolEvent::status("b", true));
    }

    #[tokio::test]
    async fn test_missing_emitter_is_tolerated() {
        emit(None, ToolEvent::message("ignored")).await;
    }
}
