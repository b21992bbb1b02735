//! Session store seam.

use std::sync::RwLock;

/// Read access to the signed-in user's identity.
///
/// Implemented by the host application; read by the connection manager when
/// joining rooms and by the payload normalizer.
pub trait SessionStore: Send + Sync + std::fmt::Debug {
    /// Identifier of the signed-in user, if any.
    fn user_id(&self) -> Option<String>;
}

/// Process-wide in-memory session store with a single writer.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    user_id: RwLock<Option<String>>,
}

impl MemorySessionStore {
    /// Creates a store seeded with an optional user id.
    pub fn new(user_id: Option<String>) -> Self {
        Self {
            user_id: RwLock::new(user_id.filter(|id| !id.is_empty())),
        }
    }

    /// Replaces the signed-in user (sign-in, sign-out).
    pub fn set_user_id(&self, user_id: Option<String>) {
        let mut guard = self.user_id.write().unwrap_or_else(|e| e.into_inner());
        *guard = user_id.filter(|id| !id.is_empty());
    }
}

impl SessionStore for MemorySessionStore {
    fn user_id(&self) -> Option<String> {
        self.user_id
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}
