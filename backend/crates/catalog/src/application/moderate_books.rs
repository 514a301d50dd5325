//! Book Publication Moderation
//!
//! Books start as unpublished drafts. Approval publishes exactly once
//! (a concurrent double-approve loses with a conflict); rejection
//! deactivates instead of deleting, so the record and file survive for
//! resubmission and audit. Featuring appends to the end of the
//! featured ordering; unfeaturing clears the slot without renumbering.

use std::sync::Arc;

use platform::cache::CacheStore;

use crate::application::cache_keys;
use crate::domain::entity::book::Book;
use crate::domain::repository::BookRepository;
use crate::error::{CatalogError, CatalogResult};

/// Book moderation use case
pub struct ModerateBooksUseCase<B>
where
    B: BookRepository,
{
    books: Arc<B>,
    cache: Arc<dyn CacheStore>,
}

impl<B> ModerateBooksUseCase<B>
where
    B: BookRepository,
{
    pub fn new(books: Arc<B>, cache: Arc<dyn CacheStore>) -> Self {
        Self { books, cache }
    }

    async fn find(&self, public_id: &str) -> CatalogResult<Book> {
        self.books
            .find_by_public_id(public_id)
            .await?
            .ok_or(CatalogError::NotFound("Book"))
    }

    /// Listing pages change on any publish/active/featured transition.
    async fn invalidate_listings(&self, public_id: &str) {
        self.cache.invalidate_namespace(cache_keys::BOOKS_LIST).await;
        self.cache
            .invalidate_namespace(cache_keys::BOOKS_FEATURED)
            .await;
        self.cache.delete(cache_keys::BOOKS_DETAIL, public_id).await;
    }

    /// Publish a draft
    ///
    /// The store performs a conditional update, so of two racing
    /// approvals exactly one publishes and the other conflicts.
    pub async fn approve(&self, public_id: &str) -> CatalogResult<Book> {
        let book = self.find(public_id).await?;

        if !self.books.publish(&book.book_id).await? {
            return Err(CatalogError::Conflict("Book is already published".into()));
        }

        self.invalidate_listings(public_id).await;

        tracing::info!(book = %book.public_id, "Book published");
        self.find(public_id).await
    }

    /// Soft-reject by deactivation
    pub async fn reject(&self, public_id: &str, reason: &str) -> CatalogResult<Book> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(CatalogError::Validation(
                "A rejection reason is required".into(),
            ));
        }

        let mut book = self.find(public_id).await?;
        book.deactivate();
        self.books.update(&book).await?;
        self.invalidate_listings(public_id).await;

        tracing::info!(book = %book.public_id, reason, "Book rejected");
        Ok(book)
    }

    /// Enable or disable a single book
    pub async fn toggle_active(&self, public_id: &str, active: bool) -> CatalogResult<Book> {
        let mut book = self.find(public_id).await?;
        book.set_active(active);
        self.books.update(&book).await?;
        self.invalidate_listings(public_id).await;

        tracing::info!(book = %book.public_id, active, "Book active state changed");
        Ok(book)
    }

    /// Feature or unfeature a book
    ///
    /// Featuring assigns 1 + the current maximum featured order, so
    /// new features append to the end. Unfeaturing clears the order
    /// without renumbering the others.
    pub async fn toggle_featured(&self, public_id: &str, featured: bool) -> CatalogResult<Book> {
        let mut book = self.find(public_id).await?;

        if featured {
            let next = self.books.max_featured_order().await?.unwrap_or(0) + 1;
            book.feature(next);
        } else {
            book.unfeature();
        }

        self.books.update(&book).await?;
        self.invalidate_listings(public_id).await;

        tracing::info!(
            book = %book.public_id,
            featured,
            order = ?book.featured_order,
            "Book featured state changed"
        );
        Ok(book)
    }

    /// Override the featured position of an already-featured book
    ///
    /// Order values are a sort hint: uniqueness across books is not
    /// enforced here.
    pub async fn set_featured_order(&self, public_id: &str, order: i32) -> CatalogResult<Book> {
        if order < 1 {
            return Err(CatalogError::Validation(
                "Featured order must be a positive integer".into(),
            ));
        }

        let mut book = self.find(public_id).await?;
        if !book.is_featured {
            return Err(CatalogError::Validation(
                "Book is not currently featured".into(),
            ));
        }

        book.feature(order);
        self.books.update(&book).await?;
        self.cache
            .invalidate_namespace(cache_keys::BOOKS_FEATURED)
            .await;
        self.cache.delete(cache_keys::BOOKS_DETAIL, public_id).await;

        Ok(book)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{InMemoryCatalog, approved_author, draft_book, published_book};
    use platform::cache::MemoryCacheStore;
    use serde_json::json;
    use std::time::Duration;

    fn fixtures() -> (
        Arc<InMemoryCatalog>,
        Arc<MemoryCacheStore>,
        ModerateBooksUseCase<InMemoryCatalog>,
    ) {
        let repo = Arc::new(InMemoryCatalog::default());
        let cache = Arc::new(MemoryCacheStore::new());
        let use_case = ModerateBooksUseCase::new(repo.clone(), cache.clone());
        (repo, cache, use_case)
    }

    #[tokio::test]
    async fn test_approve_publishes_once_then_conflicts() {
        let (repo, _, use_case) = fixtures();
        let author = approved_author(&repo);
        let book = draft_book(&repo, &author, "Draft", "Fiction");
        let public_id = book.public_id.to_string();

        let published = use_case.approve(&public_id).await.unwrap();
        assert!(published.is_published);
        assert!(published.published_at.is_some());

        assert!(matches!(
            use_case.approve(&public_id).await,
            Err(CatalogError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_publish_invalidates_cached_listings() {
        let (repo, cache, use_case) = fixtures();
        let author = approved_author(&repo);
        let book = draft_book(&repo, &author, "Draft", "Fiction");

        cache
            .put(cache_keys::BOOKS_LIST, "p1:l20", &json!({"total": 0}), Duration::from_secs(60))
            .await;

        use_case.approve(&book.public_id.to_string()).await.unwrap();

        assert!(cache.get(cache_keys::BOOKS_LIST, "p1:l20").await.is_none());
    }

    #[tokio::test]
    async fn test_reject_deactivates_and_requires_reason() {
        let (repo, _, use_case) = fixtures();
        let author = approved_author(&repo);
        let book = draft_book(&repo, &author, "Draft", "Fiction");
        let public_id = book.public_id.to_string();

        assert!(matches!(
            use_case.reject(&public_id, "").await,
            Err(CatalogError::Validation(_))
        ));

        let rejected = use_case.reject(&public_id, "Broken file").await.unwrap();
        assert!(!rejected.is_active);
        // Soft reject: the record survives.
        assert!(repo.get_book(&book.book_id).is_some());
    }

    #[tokio::test]
    async fn test_featuring_appends_and_unfeaturing_does_not_renumber() {
        let (repo, _, use_case) = fixtures();
        let author = approved_author(&repo);
        let b1 = published_book(&repo, &author, "B1", "Fiction");
        let b2 = published_book(&repo, &author, "B2", "Fiction");
        let b3 = published_book(&repo, &author, "B3", "Fiction");

        for book in [&b1, &b2, &b3] {
            use_case
                .toggle_featured(&book.public_id.to_string(), true)
                .await
                .unwrap();
        }

        assert_eq!(repo.get_book(&b1.book_id).unwrap().featured_order, Some(1));
        assert_eq!(repo.get_book(&b2.book_id).unwrap().featured_order, Some(2));
        assert_eq!(repo.get_book(&b3.book_id).unwrap().featured_order, Some(3));

        use_case
            .toggle_featured(&b2.public_id.to_string(), false)
            .await
            .unwrap();

        let b2_row = repo.get_book(&b2.book_id).unwrap();
        assert!(!b2_row.is_featured);
        assert_eq!(b2_row.featured_order, None);
        // The others keep their slots.
        assert_eq!(repo.get_book(&b1.book_id).unwrap().featured_order, Some(1));
        assert_eq!(repo.get_book(&b3.book_id).unwrap().featured_order, Some(3));
    }

    #[tokio::test]
    async fn test_set_featured_order_on_non_featured_book_mutates_nothing() {
        let (repo, _, use_case) = fixtures();
        let author = approved_author(&repo);
        let book = published_book(&repo, &author, "B1", "Fiction");
        let before = repo.get_book(&book.book_id).unwrap();

        let result = use_case
            .set_featured_order(&book.public_id.to_string(), 5)
            .await;
        assert!(matches!(result, Err(CatalogError::Validation(_))));

        let after = repo.get_book(&book.book_id).unwrap();
        assert!(!after.is_featured);
        assert_eq!(after.featured_order, None);
        assert_eq!(after.updated_at, before.updated_at);
    }

    #[tokio::test]
    async fn test_set_featured_order_rejects_non_positive() {
        let (repo, _, use_case) = fixtures();
        let author = approved_author(&repo);
        let book = published_book(&repo, &author, "B1", "Fiction");

        use_case
            .toggle_featured(&book.public_id.to_string(), true)
            .await
            .unwrap();

        assert!(matches!(
            use_case.set_featured_order(&book.public_id.to_string(), 0).await,
            Err(CatalogError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_set_featured_order_does_not_enforce_uniqueness() {
        // Order values are a sort hint; duplicates are allowed.
        let (repo, _, use_case) = fixtures();
        let author = approved_author(&repo);
        let b1 = published_book(&repo, &author, "B1", "Fiction");
        let b2 = published_book(&repo, &author, "B2", "Fiction");

        for book in [&b1, &b2] {
            use_case
                .toggle_featured(&book.public_id.to_string(), true)
                .await
                .unwrap();
        }

        use_case
            .set_featured_order(&b2.public_id.to_string(), 1)
            .await
            .unwrap();

        assert_eq!(repo.get_book(&b1.book_id).unwrap().featured_order, Some(1));
        assert_eq!(repo.get_book(&b2.book_id).unwrap().featured_order, Some(1));
    }
}
