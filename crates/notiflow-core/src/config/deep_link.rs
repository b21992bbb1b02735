//! Payment-result deep-link configuration.

use serde::{Deserialize, Serialize};

/// Recognized deep-link prefixes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeepLinkConfig {
    /// Custom URL scheme (without `://`).
    #[serde(default = "default_scheme")]
    pub scheme: String,
    /// Host of the https universal-link form.
    #[serde(default = "default_universal_host")]
    pub universal_host: String,
}

impl Default for DeepLinkConfig {
    fn default() -> Self {
        Self {
            scheme: default_scheme(),
            universal_host: default_universal_host(),
        }
    }
}

fn default_scheme() -> String {
    "coolmate".to_string()
}

fn default_universal_host() -> String {
    "coolmate.me".to_string()
}
