use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Why the client is in `Disconnected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectReason {
    /// Closed unexpectedly; a reconnect is pending.
    ConnectionLost,
    /// Reconnect attempts exhausted. Terminal until `connect()` is called again.
    GaveUp,
    /// `disconnect()` was called.
    ClosedByCaller,
}

/// Lifecycle notifications broadcast to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RealtimeEvent {
    Connecting,
    Connected,
    Disconnected(DisconnectReason),
    ReconnectScheduled { attempt: u32, delay: Duration },
    GaveUp,
    ClosedByCaller,
}

/// A message received from the server.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    /// Payload that parsed as JSON.
    Json(Value),
    /// Anything else, unchanged.
    Text(String),
}

impl InboundMessage {
    pub fn parse(text: String) -> Self {
        match serde_json::from_str::<Value>(&text) {
            Ok(value) => InboundMessage::Json(value),
            Err(_) => InboundMessage::Text(text),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            InboundMessage::Text(text) => Some(text),
            InboundMessage::Json(_) => None,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            InboundMessage::Json(value) => Some(value),
            InboundMessage::Text(_) => None,
        }
    }
}

/// A message to send. Text goes out as-is, JSON values are serialized.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundMessage {
    Text(String),
    Json(Value),
}

impl OutboundMessage {
    pub fn into_text(self) -> Result<String, RealtimeError> {
        match self {
            OutboundMessage::Text(text) => Ok(text),
            OutboundMessage::Json(value) => Ok(serde_json::to_string(&value)?),
        }
    }
}

impl From<String> for OutboundMessage {
    fn from(text: String) -> Self {
        OutboundMessage::Text(text)
    }
}

impl From<&str> for OutboundMessage {
    fn from(text: &str) -> Self {
        OutboundMessage::Text(text.to_string())
    }
}

impl From<Value> for OutboundMessage {
    fn from(value: Value) -> Self {
        OutboundMessage::Json(value)
    }
}

/// Errors from the realtime client.
#[derive(Debug, Error)]
pub enum RealtimeError {
    #[error("Failed to connect to {url}: {reason}")]
    ConnectFailed { url: String, reason: String },

    #[error("Connection attempt was superseded by connect() or disconnect()")]
    Cancelled,

    #[error("Failed to serialize message: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_inbound_json_parsed() {
        let msg = InboundMessage::parse(r#"{"type":"cart","count":2}"#.to_string());
        assert_eq!(msg, InboundMessage::Json(json!({"type": "cart", "count": 2})));
    }

    #[test]
    fn test_inbound_non_json_kept_verbatim() {
        let msg = InboundMessage::parse("Connected to WebSocket server".to_string());
        assert_eq!(msg.as_text(), Some("Connected to WebSocket server"));
        assert!(msg.as_json().is_none());
    }

    #[test]
    fn test_outbound_json_serialized() {
        let text = OutboundMessage::from(json!({"a": 1})).into_text().unwrap();
        assert_eq!(text, r#"{"a":1}"#);

        let text = OutboundMessage::from("plain").into_text().unwrap();
        assert_eq!(text, "plain");
    }
}
