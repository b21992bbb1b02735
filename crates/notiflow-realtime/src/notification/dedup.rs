//! Suppression of repeated notification ids within a time window.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Remembers when each key was last let through.
#[derive(Debug)]
pub struct Deduplicator {
    /// Window duration; zero disables suppression.
    window: Duration,
    /// Last seen time per key.
    last_seen: Mutex<HashMap<String, Instant>>,
}

impl Deduplicator {
    /// Create a new deduplicator with the given window.
    pub fn new(window_ms: u64) -> Self {
        Self {
            window: Duration::from_millis(window_ms),
            last_seen: Mutex::new(HashMap::new()),
        }
    }

    /// Returns `true` if the key should proceed, `false` if it is a repeat
    /// inside the window.
    pub fn should_dispatch(&self, key: &str) -> bool {
        if self.window.is_zero() {
            return true;
        }

        let mut map = self.last_seen.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();

        if let Some(last) = map.get(key) {
            if now.duration_since(*last) < self.window {
                return false;
            }
        }

        map.insert(key.to_string(), now);
        if map.len() > 1024 {
            let window = self.window;
            map.retain(|_, seen| now.duration_since(*seen) < window);
        }
        true
    }
}
