//! Payment-result deep-link codec.
//!
//! Two URL forms are recognized:
//!
//! - `<scheme>://payment-result?orderId=..&status=..`
//! - `https://<host>/payment-result?orderId=..&status=..`
//!
//! A `#/` fragment separator is treated as `?`, so hash-routed links decode
//! the same way.

use chrono::Utc;
use thiserror::Error;
use tracing::debug;

use notiflow_core::config::DeepLinkConfig;
use notiflow_core::types::DeepLinkResult;

/// Path segment shared by both URL forms.
const PAYMENT_RESULT_PATH: &str = "payment-result";

/// Why a URL could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeepLinkError {
    /// Blank input.
    #[error("deep link is empty")]
    Empty,
    /// Scheme, host or path is not a payment-result link.
    #[error("not a payment-result link: {0}")]
    Unrecognized(String),
}

/// Encodes and decodes payment-result links for one scheme and host.
#[derive(Debug, Clone)]
pub struct DeepLinkCodec {
    custom_prefix: String,
    universal_prefix: String,
}

impl DeepLinkCodec {
    /// Creates a codec for the configured scheme and universal-link host.
    pub fn new(config: &DeepLinkConfig) -> Self {
        Self {
            custom_prefix: format!("{}://{PAYMENT_RESULT_PATH}", config.scheme),
            universal_prefix: format!("https://{}/{PAYMENT_RESULT_PATH}", config.universal_host),
        }
    }

    /// Builds a custom-scheme link.
    ///
    /// Keys appear in a fixed order and absent fields are left out. A
    /// missing timestamp is filled with the current epoch milliseconds.
    pub fn encode(&self, result: &DeepLinkResult) -> String {
        let amount = result.amount.map(|a| a.to_string());
        let timestamp = result
            .timestamp
            .clone()
            .unwrap_or_else(|| Utc::now().timestamp_millis().to_string());

        let fields: [(&str, Option<&str>); 7] = [
            ("orderId", result.order_id.as_deref()),
            ("status", result.status.as_deref()),
            ("amount", amount.as_deref()),
            ("transactionId", result.transaction_id.as_deref()),
            ("errorCode", result.error_code.as_deref()),
            ("errorMessage", result.error_message.as_deref()),
            ("timestamp", Some(timestamp.as_str())),
        ];

        let query = fields
            .iter()
            .filter_map(|(key, value)| value.map(|v| format!("{key}={}", urlencoding::encode(v))))
            .collect::<Vec<_>>()
            .join("&");

        format!("{}?{query}", self.custom_prefix)
    }

    /// Parses a payment-result link.
    ///
    /// Decoding succeeds for any recognized link, even one missing required
    /// fields; use [`DeepLinkResult::is_valid`] before routing.
    pub fn decode(&self, url: &str) -> Result<DeepLinkResult, DeepLinkError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(DeepLinkError::Empty);
        }

        let rest = url
            .strip_prefix(&self.custom_prefix)
            .or_else(|| url.strip_prefix(&self.universal_prefix))
            .ok_or_else(|| DeepLinkError::Unrecognized(url.to_string()))?;

        let rest = rest.replacen("#/", "?", 1);
        let rest = rest.strip_prefix('/').unwrap_or(rest.as_str());
        let query = match rest.split_once('?') {
            Some(("", query)) => query.trim_start_matches('?'),
            None if rest.is_empty() => "",
            _ => return Err(DeepLinkError::Unrecognized(url.to_string())),
        };
        let query = query.split('#').next().unwrap_or_default();

        let mut result = DeepLinkResult::default();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            if value.is_empty() {
                continue;
            }
            let value = value.into_owned();
            match key.as_ref() {
                "orderId" => result.order_id = Some(value),
                "status" => result.status = Some(value),
                "amount" => result.amount = value.parse::<f64>().ok().filter(|a| a.is_finite()),
                "transactionId" => result.transaction_id = Some(value),
                "errorCode" => result.error_code = Some(value),
                "errorMessage" => result.error_message = Some(value),
                "timestamp" => result.timestamp = Some(value),
                other => debug!(key = %other, "Ignoring unknown deep-link parameter"),
            }
        }

        Ok(result)
    }
}
