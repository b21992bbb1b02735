//! Recognized server event kinds.
//!
//! The connection manager forwards every frame untouched; this is the single
//! place where event names are mapped to payload variants.

use serde_json::{Map, Value};

use super::types::Frame;

/// Event names carrying an already notification-shaped payload.
pub const NOTIFICATION_EVENTS: [&str; 2] = ["notification", "new_notification"];
/// Event names carrying an order status transition.
pub const STATUS_CHANGE_EVENTS: [&str; 3] = [
    "order_status_changed",
    "order_status_update",
    "orderStatusChanged",
];

/// A server event the notification pipeline understands.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// Direct notification.
    Notification(Map<String, Value>),
    /// Domain status transition that must be synthesized into a notification.
    StatusChange(Map<String, Value>),
}

impl InboundEvent {
    /// Maps a frame to a recognized event; `None` for any other event name.
    pub fn classify(frame: &Frame) -> Option<Self> {
        let name = frame.event.as_str();
        if NOTIFICATION_EVENTS.contains(&name) {
            Some(Self::Notification(payload_map(&frame.data)))
        } else if STATUS_CHANGE_EVENTS.contains(&name) {
            Some(Self::StatusChange(payload_map(&frame.data)))
        } else {
            None
        }
    }
}

/// Coerces a frame payload to an object.
///
/// Servers sometimes send the object JSON-encoded as a string; a plain
/// string becomes the body.
fn payload_map(data: &Value) -> Map<String, Value> {
    match data {
        Value::Object(map) => map.clone(),
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => map,
            _ => {
                let mut map = Map::new();
                map.insert("body".to_string(), Value::String(text.clone()));
                map
            }
        },
        _ => Map::new(),
    }
}
