//! Frame exchanged over the real-time transport.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Event name used to request a room join.
pub const JOIN_EVENT: &str = "join";

/// A named event with a JSON payload, in either direction.
///
/// On the wire a frame is a JSON text message `{"event": ..., "data": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Event name.
    pub event: String,
    /// Event payload.
    #[serde(default)]
    pub data: Value,
}

impl Frame {
    /// Creates a frame.
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }

    /// Room join request.
    pub fn join(room: &str) -> Self {
        Self::new(JOIN_EVENT, Value::String(room.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_shape() {
        let frame = Frame::join("order_u1");
        let text = serde_json::to_string(&frame).expect("serialize");
        assert_eq!(text, r#"{"event":"join","data":"order_u1"}"#);
    }

    #[test]
    fn test_missing_data_is_null() {
        let frame: Frame = serde_json::from_str(r#"{"event":"ping"}"#).expect("parse");
        assert_eq!(frame, Frame::new("ping", json!(null)));
    }
}
