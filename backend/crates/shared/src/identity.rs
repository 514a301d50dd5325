//! Request Identity Vocabulary
//!
//! Roles and the authenticated identity carried through a request.
//! The auth gate builds an [`Identity`] from a verified bearer token
//! plus a live session record; downstream handlers read it from
//! request extensions.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::id::{SessionId, UserId};

/// Marketplace roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(i16)]
pub enum Role {
    #[default]
    Reader = 0,
    Author = 1,
    Admin = 2,
}

impl Role {
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    #[inline]
    pub const fn code(&self) -> &'static str {
        use Role::*;
        match self {
            Reader => "reader",
            Author => "author",
            Admin => "admin",
        }
    }

    #[inline]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Whether the role may own and upload books
    #[inline]
    pub const fn is_author_or_higher(&self) -> bool {
        use Role::*;
        matches!(self, Author | Admin)
    }

    /// Lookup from the database representation
    ///
    /// Database values are written exclusively by this enum, so an
    /// unknown id means corrupted data.
    #[inline]
    pub fn from_id(id: i16) -> Option<Self> {
        use Role::*;
        match id {
            0 => Some(Reader),
            1 => Some(Author),
            2 => Some(Admin),
            _ => None,
        }
    }

    /// Lookup from the token representation
    ///
    /// Token claims are external input; unknown codes are rejected by
    /// the caller, not panicked on.
    #[inline]
    pub fn from_code(code: &str) -> Option<Self> {
        use Role::*;
        match code {
            "reader" => Some(Reader),
            "author" => Some(Author),
            "admin" => Some(Admin),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Authenticated request identity
///
/// Produced by the auth gate once per request; never constructed from
/// the token alone (the backing session must exist).
#[derive(Debug, Clone, Copy)]
pub struct Identity {
    pub user_id: UserId,
    pub role: Role,
    pub session_id: SessionId,
}

impl Identity {
    pub fn new(user_id: UserId, role: Role, session_id: SessionId) -> Self {
        Self {
            user_id,
            role,
            session_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_id() {
        assert_eq!(Role::from_id(0), Some(Role::Reader));
        assert_eq!(Role::from_id(1), Some(Role::Author));
        assert_eq!(Role::from_id(2), Some(Role::Admin));
        assert_eq!(Role::from_id(9), None);
    }

    #[test]
    fn test_role_from_code() {
        assert_eq!(Role::from_code("reader"), Some(Role::Reader));
        assert_eq!(Role::from_code("author"), Some(Role::Author));
        assert_eq!(Role::from_code("admin"), Some(Role::Admin));
        assert_eq!(Role::from_code("superuser"), None);
    }

    #[test]
    fn test_role_checks() {
        assert!(!Role::Reader.is_author_or_higher());
        assert!(Role::Author.is_author_or_higher());
        assert!(Role::Admin.is_author_or_higher());
        assert!(!Role::Reader.is_admin());
        assert!(!Role::Author.is_admin());
        assert!(Role::Admin.is_admin());
    }

    #[test]
    fn test_role_display() {
        assert_eq!(Role::Reader.to_string(), "reader");
        assert_eq!(Role::Author.to_string(), "author");
        assert_eq!(Role::Admin.to_string(), "admin");
    }
}
