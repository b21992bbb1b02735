//! Local notification presenter.
//!
//! Shows normalized records through the host [`NotificationPlatform`] and
//! turns taps on them back into records for the navigation layer.

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use notiflow_core::config::{ChannelConfig, NotificationsConfig};
use notiflow_core::result::AppResult;
use notiflow_core::types::NotificationRecord;

use super::dedup::Deduplicator;
use super::platform::{NotificationPlatform, PlatformNotification, PressEvent};

/// Tap ids remembered for exactly-once press delivery.
const MAX_REMEMBERED_TAPS: usize = 256;

/// Bounded set of tap ids already delivered.
#[derive(Debug, Default)]
struct SeenTaps {
    ids: HashSet<String>,
    order: VecDeque<String>,
}

impl SeenTaps {
    fn insert(&mut self, tap_id: &str) -> bool {
        if self.ids.contains(tap_id) {
            return false;
        }
        self.ids.insert(tap_id.to_string());
        self.order.push_back(tap_id.to_string());
        if self.order.len() > MAX_REMEMBERED_TAPS {
            if let Some(oldest) = self.order.pop_front() {
                self.ids.remove(&oldest);
            }
        }
        true
    }
}

/// Displays records and fans out presses.
#[derive(Debug)]
pub struct LocalPresenter {
    /// Host facility.
    platform: Arc<dyn NotificationPlatform>,
    /// Channels created so far, by id.
    channels: DashMap<String, ChannelConfig>,
    /// Channel records are displayed on.
    channel: ChannelConfig,
    /// Repeat suppression by record id.
    dedup: Deduplicator,
    /// Taps already delivered.
    taps: Mutex<SeenTaps>,
    /// Press fan-out.
    press_tx: broadcast::Sender<NotificationRecord>,
}

impl LocalPresenter {
    /// Creates a presenter posting on the configured channel.
    pub fn new(config: &NotificationsConfig, platform: Arc<dyn NotificationPlatform>) -> Self {
        let (press_tx, _) = broadcast::channel(config.press_buffer_size.max(1));
        Self {
            platform,
            channels: DashMap::new(),
            channel: config.channel.clone(),
            dedup: Deduplicator::new(config.dedup_window_ms),
            taps: Mutex::new(SeenTaps::default()),
            press_tx,
        }
    }

    /// The default display channel.
    pub fn channel(&self) -> &ChannelConfig {
        &self.channel
    }

    /// Create the channel if needed, or update it when its settings changed.
    ///
    /// Returns the channel id.
    pub async fn ensure_channel(&self, channel: &ChannelConfig) -> AppResult<String> {
        if self
            .channels
            .get(&channel.id)
            .is_some_and(|existing| *existing == *channel)
        {
            return Ok(channel.id.clone());
        }

        self.platform.create_channel(channel).await?;
        self.channels.insert(channel.id.clone(), channel.clone());
        debug!(channel_id = %channel.id, "Notification channel ensured");
        Ok(channel.id.clone())
    }

    /// Show a record on the default channel.
    ///
    /// Returns `true` when the platform accepted it. Failures are logged and
    /// not retried.
    pub async fn display(&self, record: &NotificationRecord) -> bool {
        if !self.dedup.should_dispatch(record.id()) {
            debug!(id = %record.id(), "Suppressed repeated notification");
            return false;
        }

        let channel_id = match self.ensure_channel(&self.channel).await {
            Ok(id) => id,
            Err(e) => {
                warn!(id = %record.id(), error = %e, "Channel setup failed, notification dropped");
                return false;
            }
        };

        let notification = PlatformNotification {
            id: record.id().to_string(),
            channel_id,
            title: record.title().to_string(),
            body: record.body().to_string(),
            data: record.attached_data(),
        };

        match self.platform.present(&notification).await {
            Ok(()) => {
                info!(
                    id = %record.id(),
                    screen = %record.target_screen(),
                    "Local notification shown"
                );
                true
            }
            Err(e) => {
                warn!(id = %record.id(), error = %e, "Failed to show local notification");
                false
            }
        }
    }

    /// Receive records for pressed notifications.
    pub fn subscribe_presses(&self) -> broadcast::Receiver<NotificationRecord> {
        self.press_tx.subscribe()
    }

    /// Handle a tap reported by the platform.
    ///
    /// Each tap is delivered once; repeats of the same tap id return `false`.
    pub fn handle_press(&self, press: PressEvent) -> bool {
        let first = self
            .taps
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(&press.tap_id);
        if !first {
            debug!(tap_id = %press.tap_id, "Ignoring repeated press");
            return false;
        }

        let record = NotificationRecord::from_attached(press.title, press.body, &press.data);
        info!(
            tap_id = %press.tap_id,
            id = %record.id(),
            screen = %record.target_screen(),
            "Notification pressed"
        );
        if self.press_tx.send(record).is_err() {
            debug!("No press subscribers");
        }
        true
    }
}
