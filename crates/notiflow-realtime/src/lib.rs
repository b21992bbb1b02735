//! # notiflow-realtime
//!
//! Client side of the real-time push channel plus the notification surface:
//!
//! - WebSocket connection lifecycle with automatic reconnect and room joins
//! - Enumerated server event kinds and push-messaging payload shapes
//! - Normalization of every source payload into a [`NotificationRecord`]
//! - Local notification presentation with press-event fan-out
//!
//! [`NotificationRecord`]: notiflow_core::types::NotificationRecord

pub mod connection;
pub mod message;
pub mod notification;

pub use connection::manager::ConnectionManager;
pub use connection::state::ConnectionState;
pub use notification::normalizer::{PayloadNormalizer, RawPayload};
pub use notification::presenter::LocalPresenter;
