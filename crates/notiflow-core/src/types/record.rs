//! Canonical notification record.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Attribute key holding the canonical order identifier.
pub const ORDER_ID_KEY: &str = "orderId";
/// Key under which the record id travels in attached notification data.
pub const ATTACHED_ID_KEY: &str = "id";
/// Key under which the target screen travels in attached notification data.
pub const ATTACHED_SCREEN_KEY: &str = "targetScreen";

/// Prefix of ids generated for events whose source carries none.
pub const LOCAL_ID_PREFIX: &str = "local-";

/// A fresh id for an event without a source id.
///
/// Unique per call, so display deduplication never merges distinct events.
pub fn local_id() -> String {
    format!("{LOCAL_ID_PREFIX}{}", Uuid::new_v4())
}

/// Logical destination screens known to the navigation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Screen {
    /// Generic notifications list.
    Notifications,
    /// Order tracking, parameterized by order id.
    OrderTracking,
    /// Payment result, parameterized by the decoded deep link.
    PaymentResult,
}

impl Screen {
    /// Screen identifier consumed by the navigation layer.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Notifications => "Notifications",
            Self::OrderTracking => "OrderTracking",
            Self::PaymentResult => "PaymentResult",
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Origin of a raw payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Direct notification event on the real-time channel.
    Realtime,
    /// Domain status transition on the real-time channel.
    StatusChange,
    /// Platform push-messaging service.
    PushMessaging,
}

impl SourceKind {
    /// Convert to string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Realtime => "realtime",
            Self::StatusChange => "status_change",
            Self::PushMessaging => "push_messaging",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single normalized notification shape consumed downstream.
///
/// Records are immutable once built; the target screen is derived from the
/// attributes so the two can never disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecord {
    id: String,
    title: String,
    body: String,
    target_screen: Screen,
    attributes: BTreeMap<String, String>,
}

impl NotificationRecord {
    /// Builds a record, deriving the target screen from the attributes.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
        attributes: BTreeMap<String, String>,
    ) -> Self {
        let target_screen = if attributes
            .get(ORDER_ID_KEY)
            .is_some_and(|v| !v.is_empty())
        {
            Screen::OrderTracking
        } else {
            Screen::Notifications
        };

        Self {
            id: id.into(),
            title: title.into(),
            body: body.into(),
            target_screen,
            attributes,
        }
    }

    /// Rebuilds a record from the data attached to a displayed notification.
    pub fn from_attached(
        title: impl Into<String>,
        body: impl Into<String>,
        data: &BTreeMap<String, String>,
    ) -> Self {
        let mut attributes = data.clone();
        let id = attributes
            .remove(ATTACHED_ID_KEY)
            .filter(|id| !id.is_empty())
            .unwrap_or_else(local_id);
        attributes.remove(ATTACHED_SCREEN_KEY);
        Self::new(id, title, body, attributes)
    }

    /// Flat string data to attach to a displayed notification.
    ///
    /// Contains every attribute plus the record id and target screen.
    pub fn attached_data(&self) -> BTreeMap<String, String> {
        let mut data = self.attributes.clone();
        data.insert(ATTACHED_ID_KEY.to_string(), self.id.clone());
        data.insert(
            ATTACHED_SCREEN_KEY.to_string(),
            self.target_screen.as_str().to_string(),
        );
        data
    }

    /// Stable identity.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Display body.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Logical destination.
    pub fn target_screen(&self) -> Screen {
        self.target_screen
    }

    /// Source-specific fields, flattened to strings.
    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// Single attribute lookup.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// The canonical order identifier, if any.
    pub fn order_id(&self) -> Option<&str> {
        self.attribute(ORDER_ID_KEY).filter(|v| !v.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_target_screen_follows_order_id() {
        let with_order = NotificationRecord::new("1", "t", "b", attrs(&[("orderId", "ORD-1")]));
        assert_eq!(with_order.target_screen(), Screen::OrderTracking);
        assert_eq!(with_order.order_id(), Some("ORD-1"));

        let without = NotificationRecord::new("2", "t", "b", attrs(&[("type", "promo")]));
        assert_eq!(without.target_screen(), Screen::Notifications);
        assert_eq!(without.order_id(), None);
    }

    #[test]
    fn test_empty_order_id_is_ignored() {
        let record = NotificationRecord::new("1", "t", "b", attrs(&[("orderId", "")]));
        assert_eq!(record.target_screen(), Screen::Notifications);
    }

    #[test]
    fn test_local_ids_are_unique() {
        let first = local_id();
        let second = local_id();
        assert!(first.starts_with(LOCAL_ID_PREFIX));
        assert_ne!(first, second);
    }

    #[test]
    fn test_rebuild_without_attached_id_gets_local_id() {
        let record = NotificationRecord::from_attached("t", "b", &attrs(&[("orderId", "ORD-1")]));
        assert!(record.id().starts_with(LOCAL_ID_PREFIX));

        let record = NotificationRecord::from_attached("t", "b", &attrs(&[("id", "")]));
        assert!(record.id().starts_with(LOCAL_ID_PREFIX));
    }

    #[test]
    fn test_attached_data_survives_rebuild() {
        let record = NotificationRecord::new(
            "n-42",
            "Đơn hàng đã giao hàng",
            "Đơn hàng #ORD-1 đã giao hàng",
            attrs(&[("orderId", "ORD-1"), ("status", "delivered")]),
        );
        let data = record.attached_data();
        assert_eq!(data.get("id").map(String::as_str), Some("n-42"));
        assert_eq!(
            data.get("targetScreen").map(String::as_str),
            Some("OrderTracking")
        );

        let rebuilt = NotificationRecord::from_attached(record.title(), record.body(), &data);
        assert_eq!(rebuilt, record);
    }
}
