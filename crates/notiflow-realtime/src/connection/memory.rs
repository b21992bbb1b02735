//! In-process transport for tests and local runs.
//!
//! [`MemoryConnector`] hands each accepted session to a [`MemoryServer`],
//! which exposes it as a [`MemoryPeer`] that can push frames, observe what the
//! client emitted, and drop the connection.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};

use notiflow_core::error::AppError;
use notiflow_core::result::AppResult;

use super::transport::{Connector, TransportSession};
use crate::message::types::Frame;

/// Client side of the in-memory transport.
#[derive(Debug, Clone)]
pub struct MemoryConnector {
    accepted: mpsc::UnboundedSender<MemoryPeer>,
    refuse: Arc<AtomicU32>,
    attempts: Arc<AtomicU32>,
}

/// Server side of the in-memory transport.
#[derive(Debug)]
pub struct MemoryServer {
    accepted: Mutex<mpsc::UnboundedReceiver<MemoryPeer>>,
    refuse: Arc<AtomicU32>,
    attempts: Arc<AtomicU32>,
}

/// One accepted session, seen from the server.
///
/// Dropping the peer closes the session.
#[derive(Debug)]
pub struct MemoryPeer {
    endpoint: String,
    to_client: mpsc::UnboundedSender<Frame>,
    from_client: mpsc::UnboundedReceiver<Frame>,
}

struct MemorySession {
    incoming: mpsc::UnboundedReceiver<Frame>,
    outgoing: mpsc::UnboundedSender<Frame>,
}

impl MemoryConnector {
    /// Creates a connected connector/server pair.
    pub fn pair() -> (Self, MemoryServer) {
        let (tx, rx) = mpsc::unbounded_channel();
        let refuse = Arc::new(AtomicU32::new(0));
        let attempts = Arc::new(AtomicU32::new(0));
        (
            Self {
                accepted: tx,
                refuse: refuse.clone(),
                attempts: attempts.clone(),
            },
            MemoryServer {
                accepted: Mutex::new(rx),
                refuse,
                attempts,
            },
        )
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self, endpoint: &str) -> AppResult<Box<dyn TransportSession>> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        let refused = self
            .refuse
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if refused {
            return Err(AppError::transport(format!("{endpoint} refused connection")));
        }

        let (to_client, incoming) = mpsc::unbounded_channel();
        let (outgoing, from_client) = mpsc::unbounded_channel();
        let peer = MemoryPeer {
            endpoint: endpoint.to_string(),
            to_client,
            from_client,
        };
        self.accepted
            .send(peer)
            .map_err(|_| AppError::transport("memory server is gone"))?;

        Ok(Box::new(MemorySession { incoming, outgoing }))
    }
}

impl MemoryServer {
    /// Waits for the next accepted session.
    pub async fn accept(&self) -> Option<MemoryPeer> {
        self.accepted.lock().await.recv().await
    }

    /// Refuse the next `n` connection attempts.
    pub fn refuse_next(&self, n: u32) {
        self.refuse.store(n, Ordering::SeqCst);
    }

    /// Total connection attempts so far, refused ones included.
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl MemoryPeer {
    /// Endpoint the client connected to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Push a server event to the client.
    pub fn push(&self, frame: Frame) -> bool {
        self.to_client.send(frame).is_ok()
    }

    /// Next frame emitted by the client; `None` once the client closed.
    pub async fn next_emitted(&mut self) -> Option<Frame> {
        self.from_client.recv().await
    }

    /// Frames emitted by the client and not read yet.
    pub fn drain_emitted(&mut self) -> Vec<Frame> {
        let mut frames = Vec::new();
        while let Ok(frame) = self.from_client.try_recv() {
            frames.push(frame);
        }
        frames
    }
}

#[async_trait]
impl TransportSession for MemorySession {
    async fn emit(&mut self, frame: Frame) -> AppResult<()> {
        self.outgoing
            .send(frame)
            .map_err(|_| AppError::transport("memory peer closed"))
    }

    async fn next_frame(&mut self) -> Option<AppResult<Frame>> {
        self.incoming.recv().await.map(Ok)
    }

    async fn close(&mut self) {
        self.incoming.close();
    }
}
