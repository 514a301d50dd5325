//! User Entity
//!
//! Core identity record for readers, authors, and administrators.

use chrono::{DateTime, Utc};
use kernel::id::UserId;
use kernel::identity::Role;

use crate::domain::value_object::{display_name::DisplayName, email::Email, public_id::PublicId};

/// User entity
///
/// Author-specific profile data lives in the catalog domain; this
/// record is the identity the auth gate vouches for.
#[derive(Debug, Clone)]
pub struct User {
    /// Internal UUID identifier
    pub user_id: UserId,
    /// Public-facing nanoid identifier (URL-safe)
    pub public_id: PublicId,
    /// E-mail (unique, login identifier)
    pub email: Email,
    /// Display name
    pub display_name: DisplayName,
    /// Role (Reader, Author, Admin)
    pub role: Role,
    /// Argon2id PHC hash; `None` for external-identity-only accounts
    pub password_hash: Option<String>,
    /// External identity provider subject id, when federated
    pub external_identity: Option<String>,
    /// Last successful login time
    pub last_login_at: Option<DateTime<Utc>>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with the default Reader role
    pub fn new(email: Email, display_name: DisplayName, password_hash: Option<String>) -> Self {
        let now = Utc::now();

        Self {
            user_id: UserId::new(),
            public_id: PublicId::new(),
            email,
            display_name,
            role: Role::default(),
            password_hash,
            external_identity: None,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Record successful login
    pub fn record_login(&mut self) {
        let now = Utc::now();
        self.last_login_at = Some(now);
        self.updated_at = now;
    }

    /// Update the role (author promotion, bootstrap admin)
    pub fn set_role(&mut self, role: Role) {
        self.role = role;
        self.updated_at = Utc::now();
    }
}
