//! Session seed configuration.

use serde::{Deserialize, Serialize};

/// Values used to seed the in-memory session store at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Identifier of the signed-in user, if any.
    #[serde(default)]
    pub user_id: Option<String>,
}
