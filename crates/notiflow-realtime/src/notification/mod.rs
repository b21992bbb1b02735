//! Payload normalization, status text synthesis, local presentation, and
//! display deduplication.

pub mod dedup;
pub mod normalizer;
pub mod platform;
pub mod presenter;
pub mod status;

pub use normalizer::{PayloadNormalizer, RawPayload};
pub use platform::{LogPlatform, NotificationPlatform, PlatformNotification, PressEvent};
pub use presenter::LocalPresenter;
