//! Decoded payment-result deep link.

use serde::{Deserialize, Serialize};

/// Fields carried by a payment-result deep link.
///
/// Every field is optional at the decoding level; [`DeepLinkResult::is_valid`]
/// decides whether the result may be routed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeepLinkResult {
    /// Order the payment belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// Payment status reported by the gateway.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Paid amount.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    /// Gateway transaction identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    /// Gateway error code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    /// Human-readable gateway error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Epoch milliseconds at which the link was produced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl DeepLinkResult {
    /// Creates a result with the two required fields set.
    pub fn new(order_id: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            order_id: Some(order_id.into()),
            status: Some(status.into()),
            ..Self::default()
        }
    }

    /// A result is routable iff `order_id` and `status` are both non-empty.
    pub fn is_valid(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
        present(&self.order_id) && present(&self.status)
    }
}
