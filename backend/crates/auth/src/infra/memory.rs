//! In-Memory Session Store
//!
//! Single-process fallback used when no Redis URL is configured, and
//! by tests. Entries expire lazily on read.

use std::time::{Duration, Instant};

use dashmap::DashMap;

use kernel::id::{SessionId, UserId};

use crate::domain::entity::session::SessionRecord;
use crate::domain::repository::SessionStore;
use crate::error::AuthResult;

struct Entry {
    record: SessionRecord,
    expires_at: Instant,
}

/// DashMap-backed session store
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: DashMap<SessionId, Entry>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    async fn create(&self, record: &SessionRecord, ttl: Duration) -> AuthResult<()> {
        self.sessions.insert(
            record.session_id,
            Entry {
                record: record.clone(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn get(&self, session_id: &SessionId) -> AuthResult<Option<SessionRecord>> {
        if let Some(entry) = self.sessions.get(session_id) {
            if entry.expires_at > Instant::now() {
                return Ok(Some(entry.record.clone()));
            }
        }
        // Expired entries are dropped on first read past their TTL
        self.sessions
            .remove_if(session_id, |_, e| e.expires_at <= Instant::now());
        Ok(None)
    }

    async fn delete(&self, session_id: &SessionId) -> AuthResult<()> {
        self.sessions.remove(session_id);
        Ok(())
    }

    async fn delete_all_for_user(&self, user_id: &UserId) -> AuthResult<u64> {
        let before = self.sessions.len();
        self.sessions.retain(|_, e| e.record.user_id != *user_id);
        Ok((before - self.sessions.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::id::Id;

    #[tokio::test]
    async fn test_create_get_delete() {
        let store = MemorySessionStore::new();
        let record = SessionRecord::new(Id::new());

        store.create(&record, Duration::from_secs(60)).await.unwrap();
        assert!(store.get(&record.session_id).await.unwrap().is_some());

        store.delete(&record.session_id).await.unwrap();
        assert!(store.get(&record.session_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_all_only_touches_one_user() {
        let store = MemorySessionStore::new();
        let alice: UserId = Id::new();
        let bob: UserId = Id::new();

        let a1 = SessionRecord::new(alice);
        let a2 = SessionRecord::new(alice);
        let b1 = SessionRecord::new(bob);
        for r in [&a1, &a2, &b1] {
            store.create(r, Duration::from_secs(60)).await.unwrap();
        }

        assert_eq!(store.delete_all_for_user(&alice).await.unwrap(), 2);
        assert!(store.get(&a1.session_id).await.unwrap().is_none());
        assert!(store.get(&b1.session_id).await.unwrap().is_some());
    }
}
