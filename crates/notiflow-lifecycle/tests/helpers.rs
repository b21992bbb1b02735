//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use notiflow_core::config::{AppConfig, ChannelConfig, NotificationsConfig};
use notiflow_core::result::AppResult;
use notiflow_core::traits::MemorySessionStore;
use notiflow_core::types::NavigationTarget;
use notiflow_lifecycle::{LifecycleDispatcher, Platforms};
use notiflow_navigation::Navigator;
use notiflow_realtime::connection::{MemoryConnector, MemoryPeer, MemoryServer};
use notiflow_realtime::notification::{NotificationPlatform, PlatformNotification, PressEvent};

/// Records every channel and notification it is asked to show.
#[derive(Debug, Default)]
pub struct RecordingPlatform {
    pub channels: Mutex<Vec<ChannelConfig>>,
    pub shown: Mutex<Vec<PlatformNotification>>,
}

#[async_trait]
impl NotificationPlatform for RecordingPlatform {
    async fn create_channel(&self, channel: &ChannelConfig) -> AppResult<()> {
        self.channels.lock().unwrap().push(channel.clone());
        Ok(())
    }

    async fn present(&self, notification: &PlatformNotification) -> AppResult<()> {
        self.shown.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

impl RecordingPlatform {
    pub fn shown(&self) -> Vec<PlatformNotification> {
        self.shown.lock().unwrap().clone()
    }
}

/// Records every navigation request.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    pub seen: Mutex<Vec<NavigationTarget>>,
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, target: &NavigationTarget) {
        self.seen.lock().unwrap().push(target.clone());
    }
}

impl RecordingNavigator {
    pub fn seen(&self) -> Vec<NavigationTarget> {
        self.seen.lock().unwrap().clone()
    }
}

/// Test application context
pub struct TestApp {
    pub dispatcher: Arc<LifecycleDispatcher>,
    pub server: MemoryServer,
    pub platform: Arc<RecordingPlatform>,
    pub navigator: Arc<RecordingNavigator>,
    pub session: Arc<MemorySessionStore>,
}

impl TestApp {
    /// Started dispatcher for user `u1`, not yet connected.
    pub fn new() -> Self {
        Self::with_user(Some("u1"))
    }

    pub fn with_user(user_id: Option<&str>) -> Self {
        Self::build(user_id, 0)
    }

    /// Started dispatcher for user `u1` with the configured default dedup window.
    pub fn with_default_dedup() -> Self {
        let window_ms = NotificationsConfig::default().dedup_window_ms;
        assert!(window_ms > 0);
        Self::build(Some("u1"), window_ms)
    }

    fn build(user_id: Option<&str>, dedup_window_ms: u64) -> Self {
        let mut config = AppConfig::default();
        config.realtime.endpoint = "mem://realtime".to_string();
        config.realtime.reconnect_base_delay_ms = 10;
        config.realtime.reconnect_max_delay_ms = 40;
        config.realtime.ping_interval_seconds = 0;
        config.notifications.dedup_window_ms = dedup_window_ms;

        let (connector, server) = MemoryConnector::pair();
        let platform = Arc::new(RecordingPlatform::default());
        let navigator = Arc::new(RecordingNavigator::default());
        let session = Arc::new(MemorySessionStore::new(user_id.map(str::to_string)));

        let dispatcher = Arc::new(LifecycleDispatcher::new(
            &config,
            Platforms {
                connector: Arc::new(connector),
                notifications: platform.clone(),
                navigator: navigator.clone(),
                session: session.clone(),
            },
        ));
        assert!(dispatcher.start());

        Self {
            dispatcher,
            server,
            platform,
            navigator,
            session,
        }
    }

    /// Connects and returns the server side after the three room joins.
    pub async fn connect(&self) -> MemoryPeer {
        assert!(self.dispatcher.connect());
        let mut peer = tokio::time::timeout(Duration::from_secs(2), self.server.accept())
            .await
            .expect("connection accepted in time")
            .expect("server open");
        for _ in 0..3 {
            tokio::time::timeout(Duration::from_secs(2), peer.next_emitted())
                .await
                .expect("join in time")
                .expect("join frame");
        }
        wait_until(|| self.dispatcher.connections.state().is_connected()).await;
        peer
    }

    /// Press the `index`-th shown notification.
    pub fn press(&self, index: usize) -> bool {
        let shown = self.platform.shown();
        let notification = &shown[index];
        self.dispatcher.handle_press(PressEvent {
            tap_id: uuid::Uuid::new_v4().to_string(),
            title: notification.title.clone(),
            body: notification.body.clone(),
            data: notification.data.clone(),
        })
    }
}

/// Polls `check` until it holds, failing after two seconds.
pub async fn wait_until(mut check: impl FnMut() -> bool) {
    let waited = tokio::time::timeout(Duration::from_secs(2), async {
        while !check() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert!(waited.is_ok(), "condition not reached in time");
}
