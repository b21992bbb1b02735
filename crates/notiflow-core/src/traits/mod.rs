//! Seams to external collaborators.

pub mod session;

pub use session::{MemorySessionStore, SessionStore};
