//! Out-of-band control messages posted to a cache manager.

use serde_json::Value;

/// Recognised control message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMessage {
    /// Skip waiting for the previous version's clients to close.
    SkipWaiting,
}

impl ControlMessage {
    /// Parse a message payload. Only objects whose `type` field is
    /// `"SKIP_WAITING"` are recognised; extra fields are ignored.
    pub fn parse(payload: &Value) -> Option<Self> {
        match payload.get("type").and_then(Value::as_str) {
            Some("SKIP_WAITING") => Some(ControlMessage::SkipWaiting),
            _ => None,
        }
    }
}
