//! Room membership for the current transport session.

use std::collections::BTreeSet;
use std::sync::Mutex;

/// Prefix of the notification-scoped room.
pub const NOTIFICATION_ROOM_PREFIX: &str = "notification_";
/// Prefix of the order-scoped room.
pub const ORDER_ROOM_PREFIX: &str = "order_";

/// Rooms a signed-in user must be in to receive user-scoped events.
pub fn rooms_for(user_id: &str) -> [String; 3] {
    [
        user_id.to_string(),
        format!("{NOTIFICATION_ROOM_PREFIX}{user_id}"),
        format!("{ORDER_ROOM_PREFIX}{user_id}"),
    ]
}

/// Rooms joined during the current session.
///
/// Membership is server-side and dies with the socket, so the set is cleared
/// at the start of every session and never persisted.
#[derive(Debug, Default)]
pub struct RoomMembership {
    joined: Mutex<BTreeSet<String>>,
}

impl RoomMembership {
    /// Creates an empty membership.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget all rooms (new session or teardown).
    pub fn reset(&self) {
        self.joined
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    /// Records a join. Returns `false` if the room was already joined.
    pub fn mark_joined(&self, room: &str) -> bool {
        self.joined
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(room.to_string())
    }

    /// Whether the room was joined in this session.
    pub fn is_joined(&self, room: &str) -> bool {
        self.joined
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(room)
    }

    /// Snapshot of joined rooms.
    pub fn joined(&self) -> BTreeSet<String> {
        self.joined
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}
