//! # notiflow-lifecycle
//!
//! Connects the notification pipeline to the app lifecycle entry points:
//! server events while in the foreground, push messages in the background,
//! notification presses, and opened deep links.

pub mod dispatcher;

pub use dispatcher::{LifecycleDispatcher, Platforms};
