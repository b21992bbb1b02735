//! Local notification surface configuration.

use serde::{Deserialize, Serialize};

/// Notification presenter settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// The single channel notifications are displayed on.
    #[serde(default)]
    pub channel: ChannelConfig,
    /// Window in milliseconds in which a repeated record id is not displayed
    /// again. `0` disables display deduplication.
    #[serde(default = "default_dedup_window")]
    pub dedup_window_ms: u64,
    /// Buffer size of the press event fan-out channel.
    #[serde(default = "default_press_buffer")]
    pub press_buffer_size: usize,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            channel: ChannelConfig::default(),
            dedup_window_ms: default_dedup_window(),
            press_buffer_size: default_press_buffer(),
        }
    }
}

/// Channel importance levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Importance {
    /// Silent, collapsed.
    Low,
    /// Sound, no heads-up.
    Default,
    /// Sound and heads-up banner.
    High,
}

/// Lock screen visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Hidden on the lock screen.
    Secret,
    /// Shown with redacted content.
    Private,
    /// Shown in full on the lock screen.
    Public,
}

/// A named notification channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Stable channel identifier.
    #[serde(default = "default_channel_id")]
    pub id: String,
    /// Display name of the channel.
    #[serde(default = "default_channel_name")]
    pub name: String,
    /// Importance level.
    #[serde(default = "default_importance")]
    pub importance: Importance,
    /// Sound name; `"default"` uses the platform sound.
    #[serde(default = "default_sound")]
    pub sound: String,
    /// Whether notifications vibrate.
    #[serde(default = "default_true")]
    pub vibration: bool,
    /// Lock screen visibility.
    #[serde(default = "default_visibility")]
    pub visibility: Visibility,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            id: default_channel_id(),
            name: default_channel_name(),
            importance: default_importance(),
            sound: default_sound(),
            vibration: true,
            visibility: default_visibility(),
        }
    }
}

fn default_dedup_window() -> u64 {
    5000
}

fn default_press_buffer() -> usize {
    64
}

fn default_channel_id() -> String {
    "default".to_string()
}

fn default_channel_name() -> String {
    "Default Channel".to_string()
}

fn default_importance() -> Importance {
    Importance::High
}

fn default_sound() -> String {
    "default".to_string()
}

fn default_true() -> bool {
    true
}

fn default_visibility() -> Visibility {
    Visibility::Public
}
