//! Repository Traits
//!
//! Persistence interfaces for the catalog. Implementations live in the
//! infrastructure layer; use cases receive them by injection so the
//! core stays testable without a live database.

use kernel::id::{AuthorId, BookId, UserId};

use crate::domain::entity::{author::Author, book::Book};
use crate::domain::value_object::AuthorStatus;
use crate::error::CatalogResult;

/// Pagination bounds shared by every listing
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

fn clamp_paging(page: u32, limit: u32) -> (u32, u32) {
    (page.max(1), limit.clamp(1, MAX_PAGE_SIZE))
}

/// Book listing filter
///
/// `cache_key` folds in every field, so two filters that could return
/// different rows can never share a cache entry.
#[derive(Debug, Clone)]
pub struct BookListFilter {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
    pub category: Option<String>,
    pub author_id: Option<AuthorId>,
    pub featured: Option<bool>,
    /// `Some(true)` public listings, `Some(false)` the admin pending
    /// queue, `None` everything
    pub published: Option<bool>,
    /// Hide deactivated books (false only for admin views)
    pub active_only: bool,
}

impl BookListFilter {
    pub fn new(page: u32, limit: u32) -> Self {
        let (page, limit) = clamp_paging(page, limit);
        Self {
            page,
            limit,
            search: None,
            category: None,
            author_id: None,
            featured: None,
            published: Some(true),
            active_only: true,
        }
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.limit)
    }

    /// Deterministic cache key covering all filter dimensions
    pub fn cache_key(&self) -> String {
        format!(
            "p{}:l{}:s{}:c{}:a{}:f{}:pub{}:act{}",
            self.page,
            self.limit,
            self.search.as_deref().unwrap_or(""),
            self.category.as_deref().unwrap_or(""),
            self.author_id.map(|id| id.to_string()).unwrap_or_default(),
            self.featured.map(|f| f.to_string()).unwrap_or_default(),
            self.published.map(|p| p.to_string()).unwrap_or_default(),
            self.active_only,
        )
    }
}

impl Default for BookListFilter {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

/// Author listing filter
#[derive(Debug, Clone)]
pub struct AuthorListFilter {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
    pub status: Option<AuthorStatus>,
    pub active_only: bool,
}

impl AuthorListFilter {
    pub fn new(page: u32, limit: u32) -> Self {
        let (page, limit) = clamp_paging(page, limit);
        Self {
            page,
            limit,
            search: None,
            status: None,
            active_only: true,
        }
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.limit)
    }

    pub fn cache_key(&self) -> String {
        format!(
            "p{}:l{}:s{}:st{}:act{}",
            self.page,
            self.limit,
            self.search.as_deref().unwrap_or(""),
            self.status.map(|s| s.code()).unwrap_or(""),
            self.active_only,
        )
    }
}

impl Default for AuthorListFilter {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

/// Author repository trait
#[trait_variant::make(AuthorRepository: Send)]
pub trait LocalAuthorRepository {
    /// Create a new author application
    async fn create(&self, author: &Author) -> CatalogResult<()>;

    /// Find author by internal id
    async fn find_by_id(&self, author_id: &AuthorId) -> CatalogResult<Option<Author>>;

    /// Find author by public id
    async fn find_by_public_id(&self, public_id: &str) -> CatalogResult<Option<Author>>;

    /// Find the author record of a user (at most one exists)
    async fn find_by_user_id(&self, user_id: &UserId) -> CatalogResult<Option<Author>>;

    /// Update author
    async fn update(&self, author: &Author) -> CatalogResult<()>;

    /// Flip `is_active`, cascading to the author's books when disabling
    ///
    /// Deactivation forces `is_active = false` on every owned book in
    /// the same transaction; re-activation touches only the author row
    /// (books stay as the admin left them). Returns the number of
    /// books the cascade touched.
    async fn set_active_cascade(&self, author_id: &AuthorId, active: bool) -> CatalogResult<u64>;

    /// Paginated author listing; returns rows plus the unpaged total
    async fn list(&self, filter: &AuthorListFilter) -> CatalogResult<(Vec<Author>, i64)>;
}

/// A book joined with the owning author's public identity
///
/// Listing and detail pages show the author's pen name; the join is
/// done in the store rather than per-row in the read path.
#[derive(Debug, Clone)]
pub struct BookWithAuthor {
    pub book: Book,
    pub author_public_id: String,
    pub author_name: String,
}

/// Book repository trait
#[trait_variant::make(BookRepository: Send)]
pub trait LocalBookRepository {
    /// Create a new book record
    async fn create(&self, book: &Book) -> CatalogResult<()>;

    /// Find book by internal id
    async fn find_by_id(&self, book_id: &BookId) -> CatalogResult<Option<Book>>;

    /// Find book by public id
    async fn find_by_public_id(&self, public_id: &str) -> CatalogResult<Option<Book>>;

    /// Find book by public id with the owning author joined in
    async fn find_detail_by_public_id(&self, public_id: &str)
    -> CatalogResult<Option<BookWithAuthor>>;

    /// Update book
    async fn update(&self, book: &Book) -> CatalogResult<()>;

    /// Delete the row; returns false when the book did not exist
    async fn delete(&self, book_id: &BookId) -> CatalogResult<bool>;

    /// Publish exactly once
    ///
    /// Conditional update (`WHERE NOT is_published`); returns false
    /// when the book was already published, so a concurrent
    /// double-approve loses cleanly instead of re-publishing.
    async fn publish(&self, book_id: &BookId) -> CatalogResult<bool>;

    /// Highest `featured_order` among currently featured books
    async fn max_featured_order(&self) -> CatalogResult<Option<i32>>;

    /// Paginated book listing; returns rows plus the unpaged total
    async fn list(&self, filter: &BookListFilter) -> CatalogResult<(Vec<BookWithAuthor>, i64)>;

    /// Drop expired time-limited access records (scheduled maintenance)
    async fn purge_expired_rentals(&self) -> CatalogResult<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_filter_cache_keys_differ_per_dimension() {
        let base = BookListFilter::new(1, 20);

        let mut fiction = base.clone();
        fiction.category = Some("Fiction".into());
        let mut folklore = base.clone();
        folklore.category = Some("Folklore".into());

        assert_ne!(fiction.cache_key(), folklore.cache_key());
        assert_ne!(base.cache_key(), fiction.cache_key());

        let page2 = BookListFilter::new(2, 20);
        assert_ne!(base.cache_key(), page2.cache_key());

        let mut admin = base.clone();
        admin.published = None;
        assert_ne!(base.cache_key(), admin.cache_key());

        let mut pending = base.clone();
        pending.published = Some(false);
        assert_ne!(base.cache_key(), pending.cache_key());
        assert_ne!(admin.cache_key(), pending.cache_key());
    }

    #[test]
    fn test_filter_clamps_paging() {
        let filter = BookListFilter::new(0, 500);
        assert_eq!(filter.page, 1);
        assert_eq!(filter.limit, MAX_PAGE_SIZE);
        assert_eq!(filter.offset(), 0);

        let filter = BookListFilter::new(3, 20);
        assert_eq!(filter.offset(), 40);
    }
}
