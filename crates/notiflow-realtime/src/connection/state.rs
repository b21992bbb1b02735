//! Connection state.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of the real-time connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// No connection and none being attempted.
    Disconnected,
    /// First connection attempt in progress.
    Connecting,
    /// Connected, rooms joined.
    Connected,
    /// Connection lost; retrying.
    Reconnecting,
}

impl ConnectionState {
    /// Convert to string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Reconnecting => "reconnecting",
        }
    }

    /// Whether the connection is usable.
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
