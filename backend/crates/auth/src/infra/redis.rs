//! Redis Session Store
//!
//! Sessions live under `session:{id}` as JSON with a TTL. A per-user
//! set `user_sessions:{user_id}` indexes every live session so forced
//! revocation can delete them all in one call.

use std::time::Duration;

use deadpool_redis::Pool;
use redis::AsyncCommands;

use kernel::id::{SessionId, UserId};

use crate::domain::entity::session::SessionRecord;
use crate::domain::repository::SessionStore;
use crate::error::{AuthError, AuthResult};

fn session_key(session_id: &SessionId) -> String {
    format!("session:{}", session_id)
}

fn user_sessions_key(user_id: &UserId) -> String {
    format!("user_sessions:{}", user_id)
}

/// Redis-backed session store
#[derive(Clone)]
pub struct RedisSessionStore {
    pool: Pool,
}

impl RedisSessionStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    async fn conn(&self) -> AuthResult<deadpool_redis::Connection> {
        self.pool
            .get()
            .await
            .map_err(|e| AuthError::SessionStore(format!("Redis pool exhausted: {}", e)))
    }
}

impl SessionStore for RedisSessionStore {
    async fn create(&self, record: &SessionRecord, ttl: Duration) -> AuthResult<()> {
        let mut conn = self.conn().await?;

        let json = serde_json::to_string(record)
            .map_err(|e| AuthError::SessionStore(format!("Session encode failed: {}", e)))?;

        let ttl_secs = ttl.as_secs().max(1);
        let user_key = user_sessions_key(&record.user_id);

        let _: () = redis::pipe()
            .set_ex(session_key(&record.session_id), json, ttl_secs)
            .sadd(&user_key, record.session_id.to_string())
            // The index must outlive the longest-lived session in it
            .expire(&user_key, ttl_secs as i64)
            .query_async(&mut conn)
            .await?;

        Ok(())
    }

    async fn get(&self, session_id: &SessionId) -> AuthResult<Option<SessionRecord>> {
        let mut conn = self.conn().await?;

        let json: Option<String> = conn.get(session_key(session_id)).await?;

        match json {
            Some(json) => {
                let record = serde_json::from_str(&json).map_err(|e| {
                    AuthError::SessionStore(format!("Session decode failed: {}", e))
                })?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, session_id: &SessionId) -> AuthResult<()> {
        let mut conn = self.conn().await?;

        // Unindex from the owner's set when the record is still around
        let json: Option<String> = conn.get(session_key(session_id)).await?;
        if let Some(json) = json {
            if let Ok(record) = serde_json::from_str::<SessionRecord>(&json) {
                let _: () = conn
                    .srem(user_sessions_key(&record.user_id), session_id.to_string())
                    .await?;
            }
        }

        let _: () = conn.del(session_key(session_id)).await?;
        Ok(())
    }

    async fn delete_all_for_user(&self, user_id: &UserId) -> AuthResult<u64> {
        let mut conn = self.conn().await?;

        let user_key = user_sessions_key(user_id);
        let session_ids: Vec<String> = conn.smembers(&user_key).await?;

        let mut deleted: u64 = 0;
        for id in &session_ids {
            let removed: u64 = conn.del(format!("session:{}", id)).await?;
            deleted += removed;
        }

        let _: () = conn.del(&user_key).await?;
        Ok(deleted)
    }
}
