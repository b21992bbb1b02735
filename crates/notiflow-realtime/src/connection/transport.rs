//! Transport seam between the connection manager and the wire.

use async_trait::async_trait;

use notiflow_core::result::AppResult;

use crate::message::types::Frame;

/// Opens transport sessions to an endpoint.
#[async_trait]
pub trait Connector: Send + Sync + std::fmt::Debug {
    /// Establish a new session.
    async fn connect(&self, endpoint: &str) -> AppResult<Box<dyn TransportSession>>;
}

/// One live connection.
#[async_trait]
pub trait TransportSession: Send {
    /// Send a frame to the server.
    async fn emit(&mut self, frame: Frame) -> AppResult<()>;

    /// Next inbound frame.
    ///
    /// `None` means the session is closed. Errors of kind `Transport` end the
    /// session; any other error is a malformed frame and the session goes on.
    async fn next_frame(&mut self) -> Option<AppResult<Frame>>;

    /// Keepalive ping.
    async fn ping(&mut self) -> AppResult<()> {
        Ok(())
    }

    /// Close the session.
    async fn close(&mut self);
}
