//! Real-time push channel configuration.

use serde::{Deserialize, Serialize};

/// Real-time (WebSocket) client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Endpoint of the real-time server.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Whether the agent connects at startup.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// First reconnect delay in milliseconds; doubled after each failure.
    #[serde(default = "default_base_delay")]
    pub reconnect_base_delay_ms: u64,
    /// Upper bound for the reconnect delay in milliseconds.
    #[serde(default = "default_max_delay")]
    pub reconnect_max_delay_ms: u64,
    /// Consecutive failed attempts before giving up. `0` retries forever.
    #[serde(default)]
    pub max_reconnect_attempts: u32,
    /// Keepalive ping interval in seconds. `0` disables pings.
    #[serde(default = "default_ping_interval")]
    pub ping_interval_seconds: u64,
    /// Buffer size of the server event fan-out channel.
    #[serde(default = "default_event_buffer")]
    pub event_buffer_size: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            enabled: true,
            reconnect_base_delay_ms: default_base_delay(),
            reconnect_max_delay_ms: default_max_delay(),
            max_reconnect_attempts: 0,
            ping_interval_seconds: default_ping_interval(),
            event_buffer_size: default_event_buffer(),
        }
    }
}

fn default_endpoint() -> String {
    "ws://localhost:3000/ws".to_string()
}

fn default_true() -> bool {
    true
}

fn default_base_delay() -> u64 {
    1000
}

fn default_max_delay() -> u64 {
    30_000
}

fn default_ping_interval() -> u64 {
    25
}

fn default_event_buffer() -> usize {
    256
}
