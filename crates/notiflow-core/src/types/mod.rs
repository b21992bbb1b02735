//! Shared domain types.

pub mod deep_link;
pub mod navigation;
pub mod record;

pub use deep_link::DeepLinkResult;
pub use navigation::NavigationTarget;
pub use record::{NotificationRecord, Screen, SourceKind};
