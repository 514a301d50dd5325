//! Author Entity
//!
//! A 1:1 extension of a user who applied to sell books. The moderation
//! engine owns `status`; the author owns the profile fields; `is_active`
//! is an admin toggle independent of status.

use chrono::{DateTime, Utc};
use kernel::id::{AuthorId, UserId};

use auth::models::public_id::PublicId;

use crate::domain::value_object::AuthorStatus;

/// Author profile fields, editable by the author themself
#[derive(Debug, Clone, Default)]
pub struct AuthorProfile {
    pub pen_name: String,
    pub bio: String,
    /// E-mail moderation notifications go to
    pub contact_email: String,
    pub location: Option<String>,
    pub background: Option<String>,
    pub genres: Vec<String>,
    pub languages: Vec<String>,
    pub payment_method: Option<String>,
    pub payment_details: Option<String>,
    pub social_links: Vec<String>,
}

/// Author entity
#[derive(Debug, Clone)]
pub struct Author {
    pub author_id: AuthorId,
    /// Owning user; at most one author record per user
    pub user_id: UserId,
    pub public_id: PublicId,
    pub profile: AuthorProfile,
    pub status: AuthorStatus,
    /// Admin kill switch, independent of `status`
    pub is_active: bool,
    /// Set only when status is Rejected
    pub rejection_reason: Option<String>,
    pub applied_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Author {
    /// Create a new pending application
    pub fn new(user_id: UserId, profile: AuthorProfile) -> Self {
        let now = Utc::now();

        Self {
            author_id: AuthorId::new(),
            user_id,
            public_id: PublicId::new(),
            profile,
            status: AuthorStatus::Pending,
            is_active: true,
            rejection_reason: None,
            applied_at: now,
            approved_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether this author may upload and sell books
    pub fn can_publish(&self) -> bool {
        self.status.is_approved() && self.is_active
    }

    pub fn approve(&mut self) {
        let now = Utc::now();
        self.status = AuthorStatus::Approved;
        self.approved_at = Some(now);
        self.rejection_reason = None;
        self.updated_at = now;
    }

    pub fn reject(&mut self, reason: String) {
        self.status = AuthorStatus::Rejected;
        self.rejection_reason = Some(reason);
        self.updated_at = Utc::now();
    }

    /// Replace the author-editable profile fields, never the status
    pub fn update_profile(&mut self, profile: AuthorProfile) {
        self.profile = profile;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::id::Id;

    fn profile() -> AuthorProfile {
        AuthorProfile {
            pen_name: "A. Writer".into(),
            bio: "Writes books".into(),
            contact_email: "writer@example.com".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_new_application_is_pending_and_active() {
        let author = Author::new(Id::new(), profile());
        assert_eq!(author.status, AuthorStatus::Pending);
        assert!(author.is_active);
        assert!(author.approved_at.is_none());
        assert!(!author.can_publish());
    }

    #[test]
    fn test_approve_sets_timestamp() {
        let mut author = Author::new(Id::new(), profile());
        author.approve();
        assert_eq!(author.status, AuthorStatus::Approved);
        assert!(author.approved_at.is_some());
        assert!(author.can_publish());
    }

    #[test]
    fn test_reject_records_reason() {
        let mut author = Author::new(Id::new(), profile());
        author.reject("Incomplete profile".into());
        assert_eq!(author.status, AuthorStatus::Rejected);
        assert_eq!(author.rejection_reason.as_deref(), Some("Incomplete profile"));
        assert!(!author.can_publish());
    }

    #[test]
    fn test_inactive_approved_author_cannot_publish() {
        let mut author = Author::new(Id::new(), profile());
        author.approve();
        author.is_active = false;
        assert!(!author.can_publish());
    }
}
