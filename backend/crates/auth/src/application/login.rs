//! Login Use Case
//!
//! Authenticates a user by email + password and creates a session.

use std::sync::Arc;

use kernel::identity::Role;
use platform::password::{ClearTextPassword, verify_password};

use crate::application::config::AuthConfig;
use crate::domain::entity::{session::SessionRecord, user::User};
use crate::domain::repository::{SessionStore, UserRepository};
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};
use crate::token::TokenCodec;

/// Login input
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Login output: the user plus a live token
pub struct LoginOutput {
    pub user: User,
    pub token: String,
}

/// Login use case
pub struct LoginUseCase<U, S>
where
    U: UserRepository,
    S: SessionStore,
{
    users: Arc<U>,
    sessions: Arc<S>,
    codec: Arc<TokenCodec>,
    config: Arc<AuthConfig>,
}

impl<U, S> LoginUseCase<U, S>
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

    pub async fn execute(&self, input: LoginInput) -> AuthResult<LoginOutput> {
        // Unknown email and wrong password collapse into the same error
        let email = Email::new(input.email).map_err(|_| AuthError::InvalidCredentials)?;

        let mut user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let stored_hash = user
            .password_hash
            .as_deref()
            .ok_or(AuthError::InvalidCredentials)?;

        let password =
            ClearTextPassword::new(input.password).map_err(|_| AuthError::InvalidCredentials)?;

        if !verify_password(&password, stored_hash, self.config.pepper())? {
            return Err(AuthError::InvalidCredentials);
        }

        // Bootstrap-admin promotion from the configured allow-list
        if user.role != Role::Admin && self.config.is_bootstrap_admin(user.email.as_str()) {
            user.set_role(Role::Admin);
            tracing::info!(public_id = %user.public_id, "Bootstrap admin promoted at login");
        }

        user.record_login();
        self.users.update(&user).await?;

        let session = SessionRecord::new(user.user_id);
        self.sessions
            .create(&session, self.config.session_ttl)
            .await?;

        let token = self
            .codec
            .issue(user.user_id, user.role, session.session_id)?;

        tracing::info!(
            public_id = %user.public_id,
            session_id = %session.session_id,
            "User logged in"
        );

        Ok(LoginOutput { user, token })
    }
}
