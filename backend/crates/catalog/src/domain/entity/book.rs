//! Book Entity
//!
//! Owned by exactly one author. Created unpublished by the upload
//! pipeline; the moderation engine owns `is_published`, `is_active`,
//! and the featured fields.

use chrono::{DateTime, Utc};
use kernel::id::{AuthorId, BookId};

use auth::models::public_id::PublicId;

/// Author-editable content fields
#[derive(Debug, Clone, Default)]
pub struct BookContent {
    pub title: String,
    pub description: String,
    pub category: String,
    pub language: String,
    pub price: f64,
    pub rental_price: Option<f64>,
    pub tags: Vec<String>,
}

/// Book entity
///
/// Invariant: `featured_order` is `Some` iff `is_featured` is true.
/// All mutation goes through the methods below, which maintain it.
#[derive(Debug, Clone)]
pub struct Book {
    pub book_id: BookId,
    pub public_id: PublicId,
    pub author_id: AuthorId,
    pub content: BookContent,
    /// Object-store key of the book file
    pub file_key: String,
    /// Object-store key of the cover image, when one was uploaded
    pub cover_key: Option<String>,
    pub is_published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub is_featured: bool,
    pub featured_order: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// Create a new unpublished book with pre-assigned id and keys
    ///
    /// The upload pipeline derives the object-store keys from the id
    /// before any blob is written, so the id is taken, not generated.
    pub fn new(
        book_id: BookId,
        author_id: AuthorId,
        content: BookContent,
        file_key: String,
        cover_key: Option<String>,
    ) -> Self {
        let now = Utc::now();

        Self {
            book_id,
            public_id: PublicId::new(),
            author_id,
            content,
            file_key,
            cover_key,
            is_published: false,
            published_at: None,
            is_active: true,
            is_featured: false,
            featured_order: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the book shows up in public listings
    pub fn is_publicly_visible(&self) -> bool {
        self.is_published && self.is_active
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.updated_at = Utc::now();
    }

    pub fn set_active(&mut self, active: bool) {
        self.is_active = active;
        self.updated_at = Utc::now();
    }

    pub fn feature(&mut self, order: i32) {
        self.is_featured = true;
        self.featured_order = Some(order);
        self.updated_at = Utc::now();
    }

    pub fn unfeature(&mut self) {
        self.is_featured = false;
        self.featured_order = None;
        self.updated_at = Utc::now();
    }

    /// Replace the author-editable content fields
    pub fn update_content(&mut self, content: BookContent) {
        self.content = content;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::id::Id;

    fn book() -> Book {
        Book::new(
            Id::new(),
            Id::new(),
            BookContent {
                title: "The Dispossessed".into(),
                category: "Fiction".into(),
                price: 9.99,
                ..Default::default()
            },
            "books/b1/file.pdf".into(),
            None,
        )
    }

    #[test]
    fn test_new_book_is_unpublished_draft() {
        let book = book();
        assert!(!book.is_published);
        assert!(book.published_at.is_none());
        assert!(book.is_active);
        assert!(!book.is_publicly_visible());
    }

    #[test]
    fn test_feature_unfeature_keeps_invariant() {
        let mut book = book();
        book.feature(3);
        assert!(book.is_featured);
        assert_eq!(book.featured_order, Some(3));

        book.unfeature();
        assert!(!book.is_featured);
        assert_eq!(book.featured_order, None);
    }
}
