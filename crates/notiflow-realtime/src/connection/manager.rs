//! Connection manager. Owns the real-time connection lifecycle
//! (connect, room joins, reconnect, fan-out of server events).

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use notiflow_core::config::RealtimeConfig;
use notiflow_core::traits::SessionStore;

use super::rooms::{RoomMembership, rooms_for};
use super::state::ConnectionState;
use super::transport::{Connector, TransportSession};
use crate::message::types::Frame;

/// Manages the single real-time connection of this process.
///
/// Server events are forwarded untouched to every subscriber; the manager
/// never interprets event names. Transport errors are logged and answered
/// with a reconnect, never surfaced.
#[derive(Debug)]
pub struct ConnectionManager {
    /// Transport used to open sessions.
    connector: Arc<dyn Connector>,
    /// Source of the signed-in user id.
    session: Arc<dyn SessionStore>,
    /// Reconnect and keepalive settings.
    config: RealtimeConfig,
    /// Published connection state.
    state_tx: Arc<watch::Sender<ConnectionState>>,
    /// Server event fan-out.
    events_tx: broadcast::Sender<Frame>,
    /// Rooms joined in the current session.
    rooms: Arc<RoomMembership>,
    /// Cancels the running connection task.
    cancel: Mutex<Option<CancellationToken>>,
    /// The running connection task.
    task: Mutex<Option<JoinHandle<()>>>,
}

impl ConnectionManager {
    /// Creates a disconnected manager.
    pub fn new(
        config: RealtimeConfig,
        connector: Arc<dyn Connector>,
        session: Arc<dyn SessionStore>,
    ) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        let (events_tx, _) = broadcast::channel(config.event_buffer_size.max(1));

        Self {
            connector,
            session,
            config,
            state_tx: Arc::new(state_tx),
            events_tx,
            rooms: Arc::new(RoomMembership::new()),
            cancel: Mutex::new(None),
            task: Mutex::new(None),
        }
    }

    /// Starts connecting to `endpoint` in the background.
    ///
    /// Returns `false` if a connection task is already running.
    pub fn connect(&self, endpoint: &str) -> bool {
        let mut task = self.task.lock().unwrap_or_else(|e| e.into_inner());
        if task.as_ref().is_some_and(|t| !t.is_finished()) {
            warn!(endpoint = %endpoint, "Real-time connection already running");
            return false;
        }

        let token = CancellationToken::new();
        let worker = ConnectionWorker {
            endpoint: endpoint.to_string(),
            connector: self.connector.clone(),
            session: self.session.clone(),
            config: self.config.clone(),
            state_tx: self.state_tx.clone(),
            events_tx: self.events_tx.clone(),
            rooms: self.rooms.clone(),
        };

        *task = Some(tokio::spawn(worker.run(token.clone())));
        *self.cancel.lock().unwrap_or_else(|e| e.into_inner()) = Some(token);

        info!(endpoint = %endpoint, "Real-time connection started");
        true
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.state_tx.borrow()
    }

    /// Receiver of connection state transitions.
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    /// Receiver of every server event, in arrival order.
    pub fn subscribe(&self) -> broadcast::Receiver<Frame> {
        self.events_tx.subscribe()
    }

    /// Rooms joined in the current session.
    pub fn joined_rooms(&self) -> BTreeSet<String> {
        self.rooms.joined()
    }

    /// Tears the connection down and waits for the task to finish.
    ///
    /// Room joins still in flight may be dropped.
    pub async fn disconnect(&self) {
        let token = self.cancel.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(token) = token {
            token.cancel();
        }

        let task = self.task.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                error!(error = %e, "Real-time connection task failed");
            }
        }

        self.rooms.reset();
        self.state_tx.send_replace(ConnectionState::Disconnected);
        info!("Real-time connection closed");
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        let token = self.cancel.get_mut().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(token) = token {
            token.cancel();
        }
    }
}

/// State moved into the background connection task.
struct ConnectionWorker {
    endpoint: String,
    connector: Arc<dyn Connector>,
    session: Arc<dyn SessionStore>,
    config: RealtimeConfig,
    state_tx: Arc<watch::Sender<ConnectionState>>,
    events_tx: broadcast::Sender<Frame>,
    rooms: Arc<RoomMembership>,
}

/// How a live session ended.
enum SessionEnd {
    Cancelled,
    Lost,
}

impl ConnectionWorker {
    async fn run(self, cancel: CancellationToken) {
        let base_delay = self.config.reconnect_base_delay_ms;
        let mut delay = base_delay;
        let mut failures: u32 = 0;
        let mut ever_connected = false;

        loop {
            if cancel.is_cancelled() {
                break;
            }

            self.set_state(if ever_connected || failures > 0 {
                ConnectionState::Reconnecting
            } else {
                ConnectionState::Connecting
            });

            let attempt = tokio::select! {
                _ = cancel.cancelled() => break,
                result = self.connector.connect(&self.endpoint) => result,
            };

            match attempt {
                Ok(mut session) => {
                    failures = 0;
                    delay = base_delay;
                    ever_connected = true;

                    self.rooms.reset();
                    self.join_rooms(session.as_mut()).await;
                    self.set_state(ConnectionState::Connected);
                    info!(endpoint = %self.endpoint, "Real-time connected");

                    match self.pump(session.as_mut(), &cancel).await {
                        SessionEnd::Cancelled => {
                            session.close().await;
                            break;
                        }
                        SessionEnd::Lost => {
                            self.rooms.reset();
                            self.set_state(ConnectionState::Reconnecting);
                        }
                    }
                }
                Err(e) => {
                    failures += 1;
                    warn!(
                        endpoint = %self.endpoint,
                        attempt = failures,
                        error = %e,
                        "Real-time connect failed"
                    );

                    let max = self.config.max_reconnect_attempts;
                    if max > 0 && failures >= max {
                        error!(
                            endpoint = %self.endpoint,
                            attempts = failures,
                            "Max reconnect attempts reached, giving up"
                        );
                        break;
                    }
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = time::sleep(Duration::from_millis(delay)) => {}
            }
            delay = (delay.saturating_mul(2)).min(self.config.reconnect_max_delay_ms.max(base_delay));
        }

        self.rooms.reset();
        self.set_state(ConnectionState::Disconnected);
        debug!(endpoint = %self.endpoint, "Real-time connection task stopped");
    }

    /// Joins the user-scoped rooms. No signed-in user means no rooms.
    async fn join_rooms(&self, session: &mut dyn TransportSession) {
        let Some(user_id) = self.session.user_id() else {
            debug!("No signed-in user, skipping room joins");
            return;
        };

        for room in rooms_for(&user_id) {
            if self.rooms.is_joined(&room) {
                continue;
            }
            match session.emit(Frame::join(&room)).await {
                Ok(()) => {
                    self.rooms.mark_joined(&room);
                    debug!(room = %room, "Joined room");
                }
                Err(e) => warn!(room = %room, error = %e, "Room join failed"),
            }
        }
    }

    /// Forwards inbound frames until the session ends.
    async fn pump(&self, session: &mut dyn TransportSession, cancel: &CancellationToken) -> SessionEnd {
        let ping_enabled = self.config.ping_interval_seconds > 0;
        let period = Duration::from_secs(self.config.ping_interval_seconds.max(1));
        let mut ping = time::interval_at(Instant::now() + period, period);
        ping.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => return SessionEnd::Cancelled,

                _ = ping.tick(), if ping_enabled => {
                    if let Err(e) = session.ping().await {
                        warn!(error = %e, "Keepalive ping failed");
                        return SessionEnd::Lost;
                    }
                    trace!("Sent keepalive ping");
                }

                frame = session.next_frame() => match frame {
                    Some(Ok(frame)) => {
                        debug!(event = %frame.event, "Server event received");
                        if self.events_tx.send(frame).is_err() {
                            trace!("No server event subscribers");
                        }
                    }
                    Some(Err(e)) if e.is_transport() => {
                        warn!(error = %e, "Real-time connection lost");
                        return SessionEnd::Lost;
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "Dropping malformed server frame");
                    }
                    None => {
                        info!(endpoint = %self.endpoint, "Real-time connection closed by server");
                        return SessionEnd::Lost;
                    }
                },
            }
        }
    }

    fn set_state(&self, state: ConnectionState) {
        let previous = self.state_tx.send_replace(state);
        if previous != state {
            debug!(from = %previous, to = %state, "Connection state changed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::memory::MemoryConnector;
    use async_trait::async_trait;
    use notiflow_core::error::AppError;
    use notiflow_core::result::AppResult;
    use notiflow_core::traits::MemorySessionStore;
    use serde_json::json;

    fn fast_config() -> RealtimeConfig {
        RealtimeConfig {
            reconnect_base_delay_ms: 10,
            reconnect_max_delay_ms: 40,
            ping_interval_seconds: 0,
            ..RealtimeConfig::default()
        }
    }

    async fn wait_for(rx: &mut watch::Receiver<ConnectionState>, want: ConnectionState) {
        time::timeout(Duration::from_secs(5), rx.wait_for(|s| *s == want))
            .await
            .expect("state reached in time")
            .expect("sender alive");
    }

    #[tokio::test]
    async fn test_joins_three_rooms_on_connect() {
        let (connector, server) = MemoryConnector::pair();
        let session = Arc::new(MemorySessionStore::new(Some("u1".into())));
        let manager = ConnectionManager::new(fast_config(), Arc::new(connector), session);

        let mut state = manager.watch_state();
        assert!(manager.connect("mem://rt"));
        let mut peer = server.accept().await.expect("peer");
        wait_for(&mut state, ConnectionState::Connected).await;

        let joined: BTreeSet<String> = peer
            .drain_emitted()
            .into_iter()
            .map(|f| {
                assert_eq!(f.event, "join");
                f.data.as_str().expect("room name").to_string()
            })
            .collect();
        let expected: BTreeSet<String> = ["u1", "notification_u1", "order_u1"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(joined, expected);
        assert_eq!(manager.joined_rooms(), expected);

        manager.disconnect().await;
        assert_eq!(manager.state(), ConnectionState::Disconnected);
    }

    /// Accepts connections whose outbound half is already broken.
    #[derive(Debug)]
    struct WriteClosedConnector;

    struct WriteClosedSession;

    #[async_trait]
    impl Connector for WriteClosedConnector {
        async fn connect(&self, _endpoint: &str) -> AppResult<Box<dyn TransportSession>> {
            Ok(Box::new(WriteClosedSession))
        }
    }

    #[async_trait]
    impl TransportSession for WriteClosedSession {
        async fn emit(&mut self, _frame: Frame) -> AppResult<()> {
            Err(AppError::transport("write half closed"))
        }

        async fn next_frame(&mut self) -> Option<AppResult<Frame>> {
            std::future::pending().await
        }

        async fn close(&mut self) {}
    }

    #[tokio::test]
    async fn test_failed_join_is_not_recorded() {
        let session = Arc::new(MemorySessionStore::new(Some("u1".into())));
        let manager =
            ConnectionManager::new(fast_config(), Arc::new(WriteClosedConnector), session);

        let mut state = manager.watch_state();
        manager.connect("mem://rt");
        wait_for(&mut state, ConnectionState::Connected).await;

        assert!(manager.joined_rooms().is_empty());
        manager.disconnect().await;
    }

    #[tokio::test]
    async fn test_no_user_joins_nothing() {
        let (connector, server) = MemoryConnector::pair();
        let session = Arc::new(MemorySessionStore::new(None));
        let manager = ConnectionManager::new(fast_config(), Arc::new(connector), session);

        let mut state = manager.watch_state();
        manager.connect("mem://rt");
        let mut peer = server.accept().await.expect("peer");
        wait_for(&mut state, ConnectionState::Connected).await;

        assert!(peer.drain_emitted().is_empty());
        assert!(manager.joined_rooms().is_empty());
        manager.disconnect().await;
    }

    #[tokio::test]
    async fn test_forwards_events_in_order() {
        let (connector, server) = MemoryConnector::pair();
        let session = Arc::new(MemorySessionStore::new(Some("u1".into())));
        let manager = ConnectionManager::new(fast_config(), Arc::new(connector), session);
        let mut events = manager.subscribe();

        manager.connect("mem://rt");
        let peer = server.accept().await.expect("peer");
        peer.push(Frame::new("notification", json!({"id": "1"})));
        peer.push(Frame::new("anything_else", json!({"id": "2"})));

        let first = events.recv().await.expect("first");
        let second = events.recv().await.expect("second");
        assert_eq!(first.event, "notification");
        assert_eq!(second.event, "anything_else");

        manager.disconnect().await;
    }

    #[tokio::test]
    async fn test_reconnect_rejoins_rooms() {
        let (connector, server) = MemoryConnector::pair();
        let session = Arc::new(MemorySessionStore::new(Some("u1".into())));
        let manager = ConnectionManager::new(fast_config(), Arc::new(connector), session);
        let mut state = manager.watch_state();

        manager.connect("mem://rt");
        let mut first = server.accept().await.expect("first peer");
        wait_for(&mut state, ConnectionState::Connected).await;
        assert_eq!(first.drain_emitted().len(), 3);

        drop(first);

        let mut second = server.accept().await.expect("second peer");
        let mut rooms = BTreeSet::new();
        for _ in 0..3 {
            let frame = time::timeout(Duration::from_secs(5), second.next_emitted())
                .await
                .expect("join in time")
                .expect("client open");
            rooms.insert(frame.data.as_str().expect("room name").to_string());
        }
        assert_eq!(rooms.len(), 3);
        assert!(rooms.contains("order_u1"));
        wait_for(&mut state, ConnectionState::Connected).await;
        assert_eq!(manager.joined_rooms().len(), 3);

        manager.disconnect().await;
    }

    #[tokio::test]
    async fn test_retries_refused_connections() {
        let (connector, server) = MemoryConnector::pair();
        server.refuse_next(2);
        let session = Arc::new(MemorySessionStore::new(None));
        let manager = ConnectionManager::new(fast_config(), Arc::new(connector), session);
        let mut state = manager.watch_state();

        manager.connect("mem://rt");
        let _peer = server.accept().await.expect("peer after retries");
        wait_for(&mut state, ConnectionState::Connected).await;
        assert_eq!(server.attempts(), 3);

        manager.disconnect().await;
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let (connector, server) = MemoryConnector::pair();
        server.refuse_next(u32::MAX);
        let config = RealtimeConfig {
            max_reconnect_attempts: 2,
            ..fast_config()
        };
        let session = Arc::new(MemorySessionStore::new(None));
        let manager = ConnectionManager::new(config, Arc::new(connector), session);

        manager.connect("mem://rt");
        let mut state = manager.watch_state();
        // The task ends on its own and publishes Disconnected.
        time::timeout(Duration::from_secs(5), async {
            loop {
                if server.attempts() >= 2 && *state.borrow() == ConnectionState::Disconnected {
                    break;
                }
                if state.changed().await.is_err() {
                    break;
                }
            }
        })
        .await
        .expect("gave up in time");
        assert_eq!(server.attempts(), 2);
    }

    #[tokio::test]
    async fn test_second_connect_is_rejected() {
        let (connector, _server) = MemoryConnector::pair();
        let session = Arc::new(MemorySessionStore::new(None));
        let manager = ConnectionManager::new(fast_config(), Arc::new(connector), session);
        assert!(manager.connect("mem://rt"));
        assert!(!manager.connect("mem://rt"));
        manager.disconnect().await;
    }
}
