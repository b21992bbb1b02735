//! Wire frames, recognized server event kinds, and push-messaging payloads.

pub mod kinds;
pub mod push;
pub mod types;

pub use kinds::InboundEvent;
pub use push::{PushContent, PushMessage};
pub use types::Frame;
