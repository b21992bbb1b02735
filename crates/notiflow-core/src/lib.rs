//! # notiflow-core
//!
//! Core crate for notiflow. Contains the canonical notification record,
//! deep-link and navigation types, configuration schemas, the session
//! store seam, and the unified error system.
//!
//! This crate has **no** internal dependencies on other notiflow crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
