//! Navigation targets handed to the external navigation layer.

use serde::Serialize;
use serde_json::{Value, json};

use super::deep_link::DeepLinkResult;
use super::record::Screen;

/// A resolved destination: screen plus parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "screen", content = "params")]
pub enum NavigationTarget {
    /// Generic notifications list.
    Notifications,
    /// Order tracking for one order.
    OrderTracking {
        /// Order to track.
        #[serde(rename = "orderId")]
        order_id: String,
    },
    /// Payment result screen with the full decoded link.
    PaymentResult(DeepLinkResult),
}

impl NavigationTarget {
    /// Destination screen.
    pub fn screen(&self) -> Screen {
        match self {
            Self::Notifications => Screen::Notifications,
            Self::OrderTracking { .. } => Screen::OrderTracking,
            Self::PaymentResult(_) => Screen::PaymentResult,
        }
    }

    /// Screen parameters as a JSON object.
    pub fn params(&self) -> Value {
        match self {
            Self::Notifications => json!({}),
            Self::OrderTracking { order_id } => json!({ "orderId": order_id }),
            Self::PaymentResult(result) => {
                serde_json::to_value(result).unwrap_or_else(|_| json!({}))
            }
        }
    }
}
