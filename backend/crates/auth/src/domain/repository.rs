//! Repository Traits
//!
//! Interfaces for persistence. Implementations live in the
//! infrastructure layer and are injected by the binary; the use cases
//! never construct store clients themselves.

use std::time::Duration;

use kernel::id::{SessionId, UserId};

use crate::domain::entity::{session::SessionRecord, user::User};
use crate::domain::value_object::email::Email;
use crate::error::AuthResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Create a new user
    async fn create(&self, user: &User) -> AuthResult<()>;

    /// Find user by ID
    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>>;

    /// Find user by email
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    /// Check if email is already registered
    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool>;

    /// Update user
    async fn update(&self, user: &User) -> AuthResult<()>;
}

/// Session store trait
///
/// A distributed key-value store mapping session id to session record.
/// Records expire by TTL; deleting one makes any token referencing it
/// unusable on the very next request.
#[trait_variant::make(SessionStore: Send)]
pub trait LocalSessionStore {
    /// Create a session with a TTL
    async fn create(&self, record: &SessionRecord, ttl: Duration) -> AuthResult<()>;

    /// Look up a live session
    async fn get(&self, session_id: &SessionId) -> AuthResult<Option<SessionRecord>>;

    /// Delete one session (logout)
    async fn delete(&self, session_id: &SessionId) -> AuthResult<()>;

    /// Delete every session of a user (forced revocation)
    async fn delete_all_for_user(&self, user_id: &UserId) -> AuthResult<u64>;
}
