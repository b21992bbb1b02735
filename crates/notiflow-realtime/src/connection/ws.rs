//! WebSocket transport over `tokio-tungstenite`.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::protocol::Message,
};
use tracing::{debug, trace};

use notiflow_core::error::{AppError, ErrorKind};
use notiflow_core::result::AppResult;

use super::transport::{Connector, TransportSession};
use crate::message::types::Frame;

/// Connects to the real-time server over WebSocket.
#[derive(Debug, Clone, Default)]
pub struct WsConnector;

impl WsConnector {
    /// Creates a connector.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, endpoint: &str) -> AppResult<Box<dyn TransportSession>> {
        let (stream, _) = connect_async(endpoint).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Transport,
                format!("WebSocket connect to {endpoint} failed"),
                e,
            )
        })?;
        debug!(endpoint = %endpoint, "WebSocket handshake complete");
        Ok(Box::new(WsSession { stream }))
    }
}

/// A live WebSocket session exchanging JSON text frames.
struct WsSession {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

fn transport_error(context: &str, err: tokio_tungstenite::tungstenite::Error) -> AppError {
    AppError::with_source(ErrorKind::Transport, context.to_string(), err)
}

fn parse_frame(text: &str) -> AppResult<Frame> {
    serde_json::from_str(text).map_err(AppError::from)
}

#[async_trait]
impl TransportSession for WsSession {
    async fn emit(&mut self, frame: Frame) -> AppResult<()> {
        let text = serde_json::to_string(&frame)?;
        self.stream
            .send(Message::Text(text.into()))
            .await
            .map_err(|e| transport_error("WebSocket send failed", e))
    }

    async fn next_frame(&mut self) -> Option<AppResult<Frame>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => return Some(parse_frame(text.as_str())),
                Ok(Message::Binary(bytes)) => {
                    let parsed = std::str::from_utf8(&bytes)
                        .map_err(|e| {
                            AppError::with_source(
                                ErrorKind::Serialization,
                                "Binary frame is not UTF-8",
                                e,
                            )
                        })
                        .and_then(parse_frame);
                    return Some(parsed);
                }
                Ok(Message::Close(reason)) => {
                    debug!(reason = ?reason, "WebSocket closed by server");
                    return None;
                }
                Ok(other) => {
                    trace!(kind = ?other, "Ignoring control frame");
                }
                Err(e) => return Some(Err(transport_error("WebSocket receive failed", e))),
            }
        }
    }

    async fn ping(&mut self) -> AppResult<()> {
        self.stream
            .send(Message::Ping(Default::default()))
            .await
            .map_err(|e| transport_error("WebSocket ping failed", e))
    }

    async fn close(&mut self) {
        if let Err(e) = self.stream.close(None).await {
            debug!(error = %e, "WebSocket close failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_frame_error_is_not_transport() {
        let err = parse_frame("{oops").unwrap_err();
        assert!(!err.is_transport());
        assert_eq!(err.kind, ErrorKind::Serialization);
    }

    #[tokio::test]
    async fn test_connect_refused_is_transport_error() {
        let connector = WsConnector::new();
        let err = match connector.connect("ws://127.0.0.1:1/ws").await {
            Ok(_) => panic!("nothing listens on port 1"),
            Err(e) => e,
        };
        assert!(err.is_transport());
    }
}
