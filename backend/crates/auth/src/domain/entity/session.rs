//! Session Record
//!
//! Ephemeral record keyed by an opaque session id. The record is the
//! source of truth for whether a previously issued token is still
//! usable: token validity alone is necessary but not sufficient.

use chrono::{DateTime, Utc};
use kernel::id::{SessionId, UserId};
use serde::{Deserialize, Serialize};

/// Session record stored in the session store with a TTL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Opaque session id (UUID v4), referenced by the token's `sid`
    pub session_id: SessionId,
    /// Owning user
    pub user_id: UserId,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Create a fresh session for a user
    pub fn new(user_id: UserId) -> Self {
        Self {
            session_id: SessionId::new(),
            user_id,
            created_at: Utc::now(),
        }
    }
}
