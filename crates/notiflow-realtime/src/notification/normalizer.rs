//! Payload normalizer: turns every source payload into a
//! [`NotificationRecord`].
//!
//! This is the only place nested payloads are flattened. Normalization is
//! total: malformed input yields a record with placeholder text, never an
//! error. Duplicate deliveries are not filtered here.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;

use notiflow_core::traits::SessionStore;
use notiflow_core::types::record::{
    ATTACHED_ID_KEY, ATTACHED_SCREEN_KEY, ORDER_ID_KEY, local_id,
};
use notiflow_core::types::{NotificationRecord, SourceKind};

use super::status::status_text;
use crate::message::kinds::InboundEvent;
use crate::message::push::PushMessage;

/// Title used when the source provides none.
pub const DEFAULT_TITLE: &str = "Thông báo mới";
/// Body used when the source provides none.
pub const DEFAULT_BODY: &str = "Trạng thái đơn hàng đã thay đổi";

/// Identifier fields, in preference order.
const ID_KEYS: [&str; 3] = ["id", "_id", "notificationId"];
/// Spellings of the order identifier, canonical first.
const ORDER_ID_KEYS: [&str; 3] = [ORDER_ID_KEY, "order_id", "orderID"];
/// Status code fields, in preference order.
const STATUS_KEYS: [&str; 2] = ["status", "orderStatus"];
/// Nested map of extra fields.
const DATA_KEY: &str = "data";
/// Attribute stamped with the signed-in user.
const USER_ID_KEY: &str = "userId";

/// Top-level keys never folded into attributes.
const RESERVED_TOP: [&str; 5] = [ATTACHED_ID_KEY, "title", "body", DATA_KEY, ATTACHED_SCREEN_KEY];
/// Nested keys never folded into attributes.
const RESERVED_NESTED: [&str; 2] = [ATTACHED_ID_KEY, ATTACHED_SCREEN_KEY];

/// A raw payload, tagged by shape at the source boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum RawPayload {
    /// Notification-shaped event from the real-time channel.
    Direct(Map<String, Value>),
    /// Order status transition from the real-time channel.
    StatusChange(Map<String, Value>),
    /// Message from the push-messaging service.
    Push(PushMessage),
}

impl RawPayload {
    /// Source kind of this payload.
    pub fn source_kind(&self) -> SourceKind {
        match self {
            Self::Direct(_) => SourceKind::Realtime,
            Self::StatusChange(_) => SourceKind::StatusChange,
            Self::Push(_) => SourceKind::PushMessaging,
        }
    }
}

impl From<InboundEvent> for RawPayload {
    fn from(event: InboundEvent) -> Self {
        match event {
            InboundEvent::Notification(map) => Self::Direct(map),
            InboundEvent::StatusChange(map) => Self::StatusChange(map),
        }
    }
}

/// Normalizes raw payloads, stamping the signed-in user where absent.
#[derive(Debug, Clone)]
pub struct PayloadNormalizer {
    session: Arc<dyn SessionStore>,
}

impl PayloadNormalizer {
    /// Creates a normalizer reading the user id from `session`.
    pub fn new(session: Arc<dyn SessionStore>) -> Self {
        Self { session }
    }

    /// Normalize any payload.
    pub fn normalize(&self, payload: &RawPayload) -> NotificationRecord {
        let user_id = self.session.user_id();
        let user_id = user_id.as_deref();

        let record = match payload {
            RawPayload::Direct(map) => normalize_direct(map, user_id),
            RawPayload::StatusChange(map) => normalize_status_change(map, user_id),
            RawPayload::Push(message) => normalize_push(message, user_id),
        };

        debug!(
            source = %payload.source_kind(),
            id = %record.id(),
            screen = %record.target_screen(),
            "Payload normalized"
        );
        record
    }
}

/// Maps a notification-shaped payload.
pub fn normalize_direct(payload: &Map<String, Value>, user_id: Option<&str>) -> NotificationRecord {
    let data = nested_map(payload);

    let id = first_id(payload)
        .or_else(|| data.as_ref().and_then(first_id))
        .unwrap_or_else(local_id);
    let title = text_field(payload, "title").unwrap_or_else(|| DEFAULT_TITLE.to_string());
    let body = text_field(payload, "body")
        .or_else(|| text_field(payload, "message"))
        .unwrap_or_else(|| DEFAULT_BODY.to_string());

    let mut attributes = BTreeMap::new();
    fold_into(&mut attributes, payload, &RESERVED_TOP);
    if let Some(data) = &data {
        fold_into(&mut attributes, data, &RESERVED_NESTED);
    }
    finish_attributes(&mut attributes, user_id);

    NotificationRecord::new(id, title, body, attributes)
}

/// Synthesizes a notification from an order status transition.
pub fn normalize_status_change(
    payload: &Map<String, Value>,
    user_id: Option<&str>,
) -> NotificationRecord {
    let data = nested_map(payload);

    let id = first_id(payload)
        .or_else(|| data.as_ref().and_then(first_id))
        .unwrap_or_else(local_id);

    let order_id = first_of(&ORDER_ID_KEYS, payload, data.as_ref());
    let code = first_of(&STATUS_KEYS, payload, data.as_ref());

    let (title, body) = match code.as_deref().map(status_text) {
        Some(text) => {
            let body = match &order_id {
                Some(order_id) => format!("Đơn hàng #{order_id} {text}"),
                None => format!("Đơn hàng của bạn {text}"),
            };
            (format!("Đơn hàng {text}"), body)
        }
        None => (DEFAULT_TITLE.to_string(), DEFAULT_BODY.to_string()),
    };

    let mut attributes = BTreeMap::new();
    fold_into(&mut attributes, payload, &RESERVED_TOP);
    if let Some(data) = &data {
        fold_into(&mut attributes, data, &RESERVED_NESTED);
    }
    finish_attributes(&mut attributes, user_id);

    NotificationRecord::new(id, title, body, attributes)
}

/// Maps a push-messaging message.
pub fn normalize_push(message: &PushMessage, user_id: Option<&str>) -> NotificationRecord {
    let data = &message.data;
    let content = message.notification.clone().unwrap_or_default();

    let id = first_id(data)
        .or_else(|| non_empty(message.message_id.as_deref()))
        .unwrap_or_else(local_id);
    let title = non_empty(content.title.as_deref())
        .or_else(|| text_field(data, "title"))
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());
    let body = non_empty(content.body.as_deref())
        .or_else(|| text_field(data, "body"))
        .unwrap_or_else(|| DEFAULT_BODY.to_string());

    let mut attributes = BTreeMap::new();
    fold_into(&mut attributes, data, &RESERVED_NESTED);
    finish_attributes(&mut attributes, user_id);

    NotificationRecord::new(id, title, body, attributes)
}

/// The nested `data` map, also when it arrives JSON-encoded as a string.
fn nested_map(payload: &Map<String, Value>) -> Option<Map<String, Value>> {
    match payload.get(DATA_KEY)? {
        Value::Object(map) => Some(map.clone()),
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => Some(map),
            _ => None,
        },
        _ => None,
    }
}

/// First of `keys` at the top level, then inside the nested map.
fn first_of(
    keys: &[&str],
    payload: &Map<String, Value>,
    data: Option<&Map<String, Value>>,
) -> Option<String> {
    keys.iter()
        .find_map(|key| text_field(payload, key))
        .or_else(|| data.and_then(|d| keys.iter().find_map(|key| text_field(d, key))))
}

fn first_id(map: &Map<String, Value>) -> Option<String> {
    ID_KEYS.iter().find_map(|key| text_field(map, key))
}

/// A scalar field as non-empty text.
fn text_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::String(s) => non_empty(Some(s)),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// String form of an attribute value; nulls are dropped.
fn coerce(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

fn fold_into(attributes: &mut BTreeMap<String, String>, map: &Map<String, Value>, skip: &[&str]) {
    for (key, value) in map {
        if skip.contains(&key.as_str()) {
            continue;
        }
        if let Some(text) = coerce(value) {
            attributes.insert(key.clone(), text);
        }
    }
}

/// Canonicalizes the order id and stamps the user.
fn finish_attributes(attributes: &mut BTreeMap<String, String>, user_id: Option<&str>) {
    let has_canonical = attributes
        .get(ORDER_ID_KEY)
        .is_some_and(|v| !v.is_empty());
    if !has_canonical {
        let alias = ORDER_ID_KEYS[1..]
            .iter()
            .find_map(|key| attributes.get(*key).filter(|v| !v.is_empty()).cloned());
        if let Some(order_id) = alias {
            attributes.insert(ORDER_ID_KEY.to_string(), order_id);
        }
    }

    if let Some(user_id) = user_id {
        attributes
            .entry(USER_ID_KEY.to_string())
            .or_insert_with(|| user_id.to_string());
    }
}
