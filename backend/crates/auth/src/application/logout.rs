//! Logout Use Case
//!
//! Deletes the backing session, which revokes the token immediately:
//! its signature and expiry still verify, but the auth gate will no
//! longer find a live session for it.

use std::sync::Arc;

use kernel::identity::Identity;

use crate::domain::repository::SessionStore;
use crate::error::AuthResult;

/// Logout use case
pub struct LogoutUseCase<S>
where
    S: SessionStore,
{
    sessions: Arc<S>,
}

impl<S> LogoutUseCase<S>
where
    S: SessionStore,
{
    pub fn new(sessions: Arc<S>) -> Self {
        Self { sessions }
    }

    /// Log out of the current session
    pub async fn execute(&self, identity: &Identity) -> AuthResult<()> {
        self.sessions.delete(&identity.session_id).await?;

        tracing::info!(session_id = %identity.session_id, "User logged out");
        Ok(())
    }

    /// Forced revocation: log out of every session of the user
    pub async fn execute_all(&self, identity: &Identity) -> AuthResult<u64> {
        let deleted = self.sessions.delete_all_for_user(&identity.user_id).await?;

        tracing::info!(
            user_id = %identity.user_id,
            deleted = deleted,
            "All sessions revoked"
        );

        Ok(deleted)
    }
}
