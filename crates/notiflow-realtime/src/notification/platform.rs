//! Seam to the host notification facility.

use std::collections::BTreeMap;
use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use notiflow_core::config::ChannelConfig;
use notiflow_core::result::AppResult;

/// What gets handed to the platform for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformNotification {
    /// Record id, also used as the platform notification id.
    pub id: String,
    /// Channel the notification is posted on.
    pub channel_id: String,
    /// Display title.
    pub title: String,
    /// Display body.
    pub body: String,
    /// Flat data attached for the press path.
    pub data: BTreeMap<String, String>,
}

/// A tap on a displayed local notification, as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PressEvent {
    /// Platform-unique id of this tap.
    pub tap_id: String,
    /// Title of the pressed notification.
    pub title: String,
    /// Body of the pressed notification.
    pub body: String,
    /// Data that was attached at display time.
    #[serde(default)]
    pub data: BTreeMap<String, String>,
}

/// Host notification facility.
#[async_trait]
pub trait NotificationPlatform: Send + Sync + Debug {
    /// Create or update a display channel.
    async fn create_channel(&self, channel: &ChannelConfig) -> AppResult<()>;

    /// Show a notification.
    async fn present(&self, notification: &PlatformNotification) -> AppResult<()>;
}

/// Platform that renders notifications into the log.
#[derive(Debug, Clone, Default)]
pub struct LogPlatform;

impl LogPlatform {
    /// Creates a log platform.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationPlatform for LogPlatform {
    async fn create_channel(&self, channel: &ChannelConfig) -> AppResult<()> {
        info!(
            channel_id = %channel.id,
            name = %channel.name,
            importance = ?channel.importance,
            "Notification channel ready"
        );
        Ok(())
    }

    async fn present(&self, notification: &PlatformNotification) -> AppResult<()> {
        info!(
            id = %notification.id,
            channel_id = %notification.channel_id,
            title = %notification.title,
            body = %notification.body,
            data = ?notification.data,
            "Notification displayed"
        );
        Ok(())
    }
}
