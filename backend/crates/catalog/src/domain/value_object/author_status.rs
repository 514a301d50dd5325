//! Author Application Status

use serde::{Deserialize, Serialize};
use std::fmt;

/// Moderation status of an author application
///
/// `Pending` transitions to `Approved` or `Rejected` exactly once.
/// The independent `is_active` flag on the author record is not part
/// of this state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(i16)]
pub enum AuthorStatus {
    #[default]
    Pending = 0,
    Approved = 1,
    Rejected = 2,
}

impl AuthorStatus {
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    #[inline]
    pub const fn code(&self) -> &'static str {
        use AuthorStatus::*;
        match self {
            Pending => "pending",
            Approved => "approved",
            Rejected => "rejected",
        }
    }

    #[inline]
    pub const fn is_pending(&self) -> bool {
        matches!(self, AuthorStatus::Pending)
    }

    #[inline]
    pub const fn is_approved(&self) -> bool {
        matches!(self, AuthorStatus::Approved)
    }

    /// Lookup from the database representation
    #[inline]
    pub fn from_id(id: i16) -> Option<Self> {
        use AuthorStatus::*;
        match id {
            0 => Some(Pending),
            1 => Some(Approved),
            2 => Some(Rejected),
            _ => None,
        }
    }

    /// Lookup from a query-string filter value
    #[inline]
    pub fn from_code(code: &str) -> Option<Self> {
        use AuthorStatus::*;
        match code {
            "pending" => Some(Pending),
            "approved" => Some(Approved),
            "rejected" => Some(Rejected),
            _ => None,
        }
    }
}

impl fmt::Display for AuthorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
