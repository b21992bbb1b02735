//! # notiflow-navigation
//!
//! Everything between a trigger and a screen change:
//!
//! - Encoding and decoding of payment-result deep links
//! - Resolution of notification records and deep links to navigation targets
//! - A router that holds requests until the navigation layer is ready

pub mod deep_link;
pub mod router;

pub use deep_link::{DeepLinkCodec, DeepLinkError};
pub use router::{
    LogNavigator, NavigationReadiness, NavigationRouter, Navigator, RouteTrigger, TriggerKind,
};
