//! Catalog Browsing (cache-aside)
//!
//! Listing and detail reads go through the cache store: check the
//! cache first, fall back to the database on a miss, then populate the
//! cache before returning. Two concurrent misses may both hit the
//! database and both write; both writes carry the same ground truth,
//! so last-write-wins is harmless.
//!
//! Cache failures never surface here: the cache store degrades a
//! failed read to a miss and drops a failed write, so browsing keeps
//! working against the database alone when the cache is down.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use platform::cache::CacheStore;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::application::cache_keys;
use crate::application::config::CatalogConfig;
use crate::domain::entity::author::Author;
use crate::domain::repository::{
    AuthorListFilter, AuthorRepository, BookListFilter, BookRepository, BookWithAuthor,
};
use crate::error::CatalogResult;

/// Pagination envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub total_pages: i64,
}

impl Pagination {
    fn new(page: u32, limit: u32, total: i64) -> Self {
        Self {
            page,
            limit,
            total,
            total_pages: (total + i64::from(limit) - 1) / i64::from(limit),
        }
    }
}

/// One page of results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

/// Public book representation (cached form)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub language: String,
    pub price: f64,
    pub rental_price: Option<f64>,
    pub tags: Vec<String>,
    pub cover_key: Option<String>,
    pub author_id: String,
    pub author_name: String,
    pub is_published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub is_featured: bool,
    pub featured_order: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl From<&BookWithAuthor> for BookView {
    fn from(row: &BookWithAuthor) -> Self {
        let book = &row.book;
        Self {
            id: book.public_id.to_string(),
            title: book.content.title.clone(),
            description: book.content.description.clone(),
            category: book.content.category.clone(),
            language: book.content.language.clone(),
            price: book.content.price,
            rental_price: book.content.rental_price,
            tags: book.content.tags.clone(),
            cover_key: book.cover_key.clone(),
            author_id: row.author_public_id.clone(),
            author_name: row.author_name.clone(),
            is_published: book.is_published,
            published_at: book.published_at,
            is_active: book.is_active,
            is_featured: book.is_featured,
            featured_order: book.featured_order,
            created_at: book.created_at,
        }
    }
}

/// Public author representation (cached form)
///
/// Payment fields stay out of the public view on purpose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorView {
    pub id: String,
    pub pen_name: String,
    pub bio: String,
    pub location: Option<String>,
    pub background: Option<String>,
    pub genres: Vec<String>,
    pub languages: Vec<String>,
    pub social_links: Vec<String>,
    pub status: String,
    pub is_active: bool,
    pub rejection_reason: Option<String>,
    pub applied_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
}

impl From<&Author> for AuthorView {
    fn from(author: &Author) -> Self {
        Self {
            id: author.public_id.to_string(),
            pen_name: author.profile.pen_name.clone(),
            bio: author.profile.bio.clone(),
            location: author.profile.location.clone(),
            background: author.profile.background.clone(),
            genres: author.profile.genres.clone(),
            languages: author.profile.languages.clone(),
            social_links: author.profile.social_links.clone(),
            status: author.status.code().to_string(),
            is_active: author.is_active,
            rejection_reason: author.rejection_reason.clone(),
            applied_at: author.applied_at,
            approved_at: author.approved_at,
        }
    }
}

/// Cache-aside read path for books and authors
pub struct BrowseUseCase<A, B>
where
    A: AuthorRepository,
    B: BookRepository,
{
    authors: Arc<A>,
    books: Arc<B>,
    cache: Arc<dyn CacheStore>,
    config: Arc<CatalogConfig>,
}

impl<A, B> BrowseUseCase<A, B>
where
    A: AuthorRepository,
    B: BookRepository,
{
    pub fn new(
        authors: Arc<A>,
        books: Arc<B>,
        cache: Arc<dyn CacheStore>,
        config: Arc<CatalogConfig>,
    ) -> Self {
        Self {
            authors,
            books,
            cache,
            config,
        }
    }

    fn decode<T: serde::de::DeserializeOwned>(ns: &str, key: &str, value: Value) -> Option<T> {
        match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                tracing::warn!(namespace = ns, key, error = %e, "Undecodable cache entry ignored");
                None
            }
        }
    }

    /// Paginated book listing
    ///
    /// Featured-filtered queries live in their own namespace so that
    /// featuring changes invalidate them without sweeping every list.
    pub async fn list_books(&self, filter: &BookListFilter) -> CatalogResult<Page<BookView>> {
        let ns = if filter.featured == Some(true) {
            cache_keys::BOOKS_FEATURED
        } else {
            cache_keys::BOOKS_LIST
        };
        let key = filter.cache_key();

        if let Some(hit) = self.cache.get(ns, &key).await {
            if let Some(page) = Self::decode(ns, &key, hit) {
                return Ok(page);
            }
        }

        let (rows, total) = self.books.list(filter).await?;
        let page = Page {
            data: rows.iter().map(BookView::from).collect(),
            pagination: Pagination::new(filter.page, filter.limit, total),
        };

        if let Ok(value) = serde_json::to_value(&page) {
            self.cache.put(ns, &key, &value, self.config.list_ttl).await;
        }

        Ok(page)
    }

    /// Single book detail by public id
    ///
    /// Misses are not cached; visibility (draft, deactivated) is the
    /// caller's concern since it depends on who is asking.
    pub async fn get_book(&self, public_id: &str) -> CatalogResult<Option<BookView>> {
        let ns = cache_keys::BOOKS_DETAIL;

        if let Some(hit) = self.cache.get(ns, public_id).await {
            if let Some(view) = Self::decode(ns, public_id, hit) {
                return Ok(Some(view));
            }
        }

        let Some(row) = self.books.find_detail_by_public_id(public_id).await? else {
            return Ok(None);
        };

        let view = BookView::from(&row);
        if let Ok(value) = serde_json::to_value(&view) {
            self.cache
                .put(ns, public_id, &value, self.config.detail_ttl)
                .await;
        }

        Ok(Some(view))
    }

    /// Paginated author listing
    pub async fn list_authors(&self, filter: &AuthorListFilter) -> CatalogResult<Page<AuthorView>> {
        let ns = cache_keys::AUTHORS_LIST;
        let key = filter.cache_key();

        if let Some(hit) = self.cache.get(ns, &key).await {
            if let Some(page) = Self::decode(ns, &key, hit) {
                return Ok(page);
            }
        }

        let (rows, total) = self.authors.list(filter).await?;
        let page = Page {
            data: rows.iter().map(AuthorView::from).collect(),
            pagination: Pagination::new(filter.page, filter.limit, total),
        };

        if let Ok(value) = serde_json::to_value(&page) {
            self.cache.put(ns, &key, &value, self.config.list_ttl).await;
        }

        Ok(page)
    }

    /// Single author detail by public id
    pub async fn get_author(&self, public_id: &str) -> CatalogResult<Option<AuthorView>> {
        let ns = cache_keys::AUTHORS_DETAIL;

        if let Some(hit) = self.cache.get(ns, public_id).await {
            if let Some(view) = Self::decode(ns, public_id, hit) {
                return Ok(Some(view));
            }
        }

        let Some(author) = self.authors.find_by_public_id(public_id).await? else {
            return Ok(None);
        };

        let view = AuthorView::from(&author);
        if let Ok(value) = serde_json::to_value(&view) {
            self.cache
                .put(ns, public_id, &value, self.config.detail_ttl)
                .await;
        }

        Ok(Some(view))
    }
}
