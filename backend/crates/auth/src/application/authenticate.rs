//! Authenticate Use Case
//!
//! The core of the auth gate: resolve a bearer token into an
//! [`Identity`]. Token validity is necessary but not sufficient; the
//! backing session record must still exist in the session store.

use std::sync::Arc;

use kernel::id::{SessionId, UserId};
use kernel::identity::{Identity, Role};

use crate::domain::repository::SessionStore;
use crate::error::{AuthError, AuthResult};
use crate::token::TokenCodec;

/// Authenticate use case
pub struct AuthenticateUseCase<S>
where
    S: SessionStore,
{
    sessions: Arc<S>,
    codec: Arc<TokenCodec>,
}

impl<S> AuthenticateUseCase<S>
where
    S: SessionStore,
{
    pub fn new(sessions: Arc<S>, codec: Arc<TokenCodec>) -> Self {
        Self { sessions, codec }
    }

    /// Resolve a raw bearer token into a live identity
    ///
    /// Fails with [`AuthError::InvalidToken`] on any signature, format,
    /// or expiry problem, and with [`AuthError::SessionExpired`] when
    /// the token verifies but the session is gone (logged out, revoked,
    /// or TTL-expired).
    pub async fn execute(&self, token: &str) -> AuthResult<Identity> {
        let claims = self.codec.verify(token)?;

        let role = Role::from_code(&claims.role).ok_or(AuthError::InvalidToken)?;
        let session_id = SessionId::from_uuid(claims.sid);

        let session = self
            .sessions
            .get(&session_id)
            .await?
            .ok_or(AuthError::SessionExpired)?;

        // The session must belong to the token's subject
        let user_id = UserId::from_uuid(claims.sub);
        if session.user_id != user_id {
            return Err(AuthError::InvalidToken);
        }

        Ok(Identity {
            user_id,
            role,
            session_id,
        })
    }
}
