//! Register Use Case
//!
//! Creates a new reader account and logs it in immediately.

use std::sync::Arc;

use platform::password::{ClearTextPassword, hash_password};

use crate::application::config::AuthConfig;
use crate::domain::entity::{session::SessionRecord, user::User};
use crate::domain::repository::{SessionStore, UserRepository};
use crate::domain::value_object::{display_name::DisplayName, email::Email};
use crate::error::{AuthError, AuthResult};
use crate::token::TokenCodec;

/// Register input
pub struct RegisterInput {
    pub email: String,
    pub display_name: String,
    pub password: String,
}

/// Register output: the created user plus a live token
pub struct RegisterOutput {
    pub user: User,
    pub token: String,
}

/// Register use case
pub struct RegisterUseCase<U, S>
where
    U: UserRepository,
    S: SessionStore,
{
    users: Arc<U>,
    sessions: Arc<S>,
    codec: Arc<TokenCodec>,
    config: Arc<AuthConfig>,
}

impl<U, S> RegisterUseCase<U, S>
where
    U: UserRepository,
    S: SessionStore,
{
    pub fn new(
        users: Arc<U>,
        sessions: Arc<S>,
        codec: Arc<TokenCodec>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            users,
            sessions,
            codec,
            config,
        }
    }

    pub async fn execute(&self, input: RegisterInput) -> AuthResult<RegisterOutput> {
        // Validate everything before touching a store
        let email = Email::new(input.email)?;
        let display_name = DisplayName::new(input.display_name)?;
        let password = ClearTextPassword::new(input.password)?;

        if self.users.exists_by_email(&email).await? {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = hash_password(&password, self.config.pepper())?;

        let mut user = User::new(email, display_name, Some(password_hash));
        user.record_login();
        self.users.create(&user).await?;

        // Auto-login: session first, then the token referencing it
        let session = SessionRecord::new(user.user_id);
        self.sessions
            .create(&session, self.config.session_ttl)
            .await?;

        let token = self
            .codec
            .issue(user.user_id, user.role, session.session_id)?;

        tracing::info!(
            public_id = %user.public_id,
            "User registered"
        );

        Ok(RegisterOutput { user, token })
    }
}
