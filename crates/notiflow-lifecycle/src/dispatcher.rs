//! Lifecycle dispatcher. Routes every entry point through
//! normalize → present → navigate.

use std::sync::{Arc, Mutex};

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use notiflow_core::config::AppConfig;
use notiflow_core::traits::SessionStore;
use notiflow_core::types::{NavigationTarget, NotificationRecord};
use notiflow_navigation::{DeepLinkCodec, NavigationRouter, Navigator, RouteTrigger};
use notiflow_realtime::connection::Connector;
use notiflow_realtime::message::{Frame, InboundEvent, PushMessage};
use notiflow_realtime::notification::{NotificationPlatform, PressEvent};
use notiflow_realtime::{ConnectionManager, LocalPresenter, PayloadNormalizer, RawPayload};

/// Host integrations the dispatcher drives.
#[derive(Debug, Clone)]
pub struct Platforms {
    /// Real-time transport.
    pub connector: Arc<dyn Connector>,
    /// Local notification facility.
    pub notifications: Arc<dyn NotificationPlatform>,
    /// Navigation layer.
    pub navigator: Arc<dyn Navigator>,
    /// Signed-in user.
    pub session: Arc<dyn SessionStore>,
}

/// Owns the pipeline components and the tasks feeding them.
#[derive(Debug)]
pub struct LifecycleDispatcher {
    /// Real-time connection.
    pub connections: Arc<ConnectionManager>,
    /// Payload normalizer.
    pub normalizer: Arc<PayloadNormalizer>,
    /// Local presenter.
    pub presenter: Arc<LocalPresenter>,
    /// Navigation router.
    pub router: Arc<NavigationRouter>,
    /// Deep-link codec.
    codec: DeepLinkCodec,
    /// Endpoint used by [`Self::connect`].
    endpoint: String,
    /// Whether the real-time channel is enabled.
    realtime_enabled: bool,
    /// Stops the event and press loops.
    cancel: CancellationToken,
    /// Running loops.
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl LifecycleDispatcher {
    /// Builds every component from configuration.
    pub fn new(config: &AppConfig, platforms: Platforms) -> Self {
        let connections = Arc::new(ConnectionManager::new(
            config.realtime.clone(),
            platforms.connector,
            platforms.session.clone(),
        ));
        let normalizer = Arc::new(PayloadNormalizer::new(platforms.session));
        let presenter = Arc::new(LocalPresenter::new(
            &config.notifications,
            platforms.notifications,
        ));
        let router = Arc::new(NavigationRouter::new(platforms.navigator));

        info!("Lifecycle dispatcher initialized");

        Self {
            connections,
            normalizer,
            presenter,
            router,
            codec: DeepLinkCodec::new(&config.deep_link),
            endpoint: config.realtime.endpoint.clone(),
            realtime_enabled: config.realtime.enabled,
            cancel: CancellationToken::new(),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Spawns the server-event and press loops.
    ///
    /// Returns `false` if already started or shut down.
    pub fn start(self: &Arc<Self>) -> bool {
        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        if !tasks.is_empty() || self.cancel.is_cancelled() {
            warn!("Lifecycle dispatcher already started");
            return false;
        }

        let events = self.connections.subscribe();
        let presses = self.presenter.subscribe_presses();
        tasks.push(tokio::spawn(self.clone().run_event_loop(events)));
        tasks.push(tokio::spawn(self.clone().run_press_loop(presses)));
        info!("Lifecycle dispatcher started");
        true
    }

    /// Opens the real-time connection when enabled.
    pub fn connect(&self) -> bool {
        if !self.realtime_enabled {
            info!("Real-time channel disabled");
            return false;
        }
        self.connections.connect(&self.endpoint)
    }

    /// Foreground path: one server event to a displayed notification.
    ///
    /// Unrecognized event names are dropped.
    pub async fn handle_server_event(&self, frame: &Frame) -> Option<NotificationRecord> {
        let Some(event) = InboundEvent::classify(frame) else {
            debug!(event = %frame.event, "Ignoring unrecognized server event");
            return None;
        };

        let record = self.normalizer.normalize(&RawPayload::from(event));
        self.presenter.display(&record).await;
        Some(record)
    }

    /// Background path: a push message delivered while not in the foreground.
    pub async fn handle_push_message(&self, message: PushMessage) -> NotificationRecord {
        if let Err(e) = self.presenter.ensure_channel(self.presenter.channel()).await {
            warn!(error = %e, "Channel setup failed for push message");
        }

        let record = self.normalizer.normalize(&RawPayload::Push(message));
        self.presenter.display(&record).await;
        record
    }

    /// A tap on a displayed notification, as reported by the platform.
    pub fn handle_press(&self, press: PressEvent) -> bool {
        self.presenter.handle_press(press)
    }

    /// A deep link opened while running.
    pub fn handle_url(&self, url: &str) -> Option<NavigationTarget> {
        match self.codec.decode(url) {
            Ok(result) => self.router.route(RouteTrigger::DeepLink(result)),
            Err(e) => {
                warn!(url = %url, error = %e, "Ignoring deep link");
                None
            }
        }
    }

    /// The link the app was launched with, if any.
    pub fn handle_initial_url(&self, url: Option<&str>) -> Option<NavigationTarget> {
        let url = url.filter(|u| !u.trim().is_empty())?;
        info!(url = %url, "Handling launch link");
        self.handle_url(url)
    }

    /// The navigation layer can accept requests now.
    pub fn mark_navigation_ready(&self) -> usize {
        self.router.mark_ready()
    }

    /// Stops the loops and the real-time connection.
    pub async fn shutdown(&self) {
        info!("Shutting down lifecycle dispatcher");
        self.cancel.cancel();

        let tasks: Vec<_> = self
            .tasks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .drain(..)
            .collect();
        for task in tasks {
            if let Err(e) = task.await {
                error!(error = %e, "Lifecycle task failed");
            }
        }

        self.connections.disconnect().await;
        info!("Lifecycle dispatcher shut down");
    }

    async fn run_event_loop(self: Arc<Self>, mut events: broadcast::Receiver<Frame>) {
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                received = events.recv() => match received {
                    Ok(frame) => {
                        self.handle_server_event(&frame).await;
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Server event loop lagged");
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }
        debug!("Server event loop stopped");
    }

    async fn run_press_loop(
        self: Arc<Self>,
        mut presses: broadcast::Receiver<NotificationRecord>,
    ) {
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                received = presses.recv() => match received {
                    Ok(record) => {
                        self.router.route(RouteTrigger::Notification(record));
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Press loop lagged");
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }
        debug!("Press loop stopped");
    }
}
