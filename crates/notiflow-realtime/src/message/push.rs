//! Platform push-messaging payload.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Display block of a push message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PushContent {
    /// Title shown by the platform.
    #[serde(default)]
    pub title: Option<String>,
    /// Body shown by the platform.
    #[serde(default)]
    pub body: Option<String>,
}

/// A message delivered by the push-messaging service in any app state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushMessage {
    /// Service-assigned message id.
    #[serde(default)]
    pub message_id: Option<String>,
    /// Optional display block.
    #[serde(default)]
    pub notification: Option<PushContent>,
    /// Custom data fields.
    #[serde(default)]
    pub data: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_data_only_message() {
        let msg: PushMessage = serde_json::from_str(
            r#"{"messageId":"0:17","data":{"orderId":"ORD-9","title":"Hi"}}"#,
        )
        .expect("parse");
        assert_eq!(msg.message_id.as_deref(), Some("0:17"));
        assert!(msg.notification.is_none());
        assert_eq!(msg.data.get("orderId"), Some(&Value::String("ORD-9".into())));
    }
}
