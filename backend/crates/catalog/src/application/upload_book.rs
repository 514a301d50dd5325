//! Book Upload Pipeline
//!
//! Validates a multipart submission, writes the blobs, then records
//! the book. The database insert comes last on purpose: if any step
//! fails after a blob was written, the already-written blobs are
//! deleted before the error surfaces. This is the one place rollback
//! is mandatory rather than best-effort, because nothing else would
//! ever reclaim an orphaned blob.

use std::sync::Arc;

use kernel::id::BookId;
use kernel::identity::Identity;
use platform::cache::CacheStore;
use platform::object::{ObjectStore, sanitize_filename};

use crate::application::cache_keys;
use crate::application::config::CatalogConfig;
use crate::domain::entity::book::{Book, BookContent};
use crate::domain::repository::{AuthorRepository, BookRepository};
use crate::error::{CatalogError, CatalogResult};

const BOOK_FILE_TYPES: &[&str] = &["application/pdf", "application/epub+zip"];
const COVER_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

/// One uploaded file part
#[derive(Debug, Clone)]
pub struct FilePart {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Upload submission
#[derive(Debug, Clone)]
pub struct UploadInput {
    pub title: String,
    pub description: String,
    pub category: String,
    pub language: String,
    pub price: f64,
    pub rental_price: Option<f64>,
    pub tags: Vec<String>,
    pub file: FilePart,
    pub cover: Option<FilePart>,
}

fn validate_price(label: &str, price: f64) -> CatalogResult<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(CatalogError::Validation(format!(
            "{label} must be a non-negative number"
        )));
    }
    Ok(())
}

/// Upload pipeline use case
pub struct UploadBookUseCase<A, B>
where
    A: AuthorRepository,
    B: BookRepository,
{
    authors: Arc<A>,
    books: Arc<B>,
    objects: Arc<dyn ObjectStore>,
    cache: Arc<dyn CacheStore>,
    config: Arc<CatalogConfig>,
}

impl<A, B> UploadBookUseCase<A, B>
where
    A: AuthorRepository,
    B: BookRepository,
{
    pub fn new(
        authors: Arc<A>,
        books: Arc<B>,
        objects: Arc<dyn ObjectStore>,
        cache: Arc<dyn CacheStore>,
        config: Arc<CatalogConfig>,
    ) -> Self {
        Self {
            authors,
            books,
            objects,
            cache,
            config,
        }
    }

    /// Validate everything that does not need store I/O
    fn validate(&self, input: &UploadInput) -> CatalogResult<()> {
        if input.title.trim().is_empty() {
            return Err(CatalogError::Validation("Title is required".into()));
        }
        if input.category.trim().is_empty() {
            return Err(CatalogError::Validation("Category is required".into()));
        }
        validate_price("Price", input.price)?;
        if let Some(rental_price) = input.rental_price {
            validate_price("Rental price", rental_price)?;
        }

        if !BOOK_FILE_TYPES.contains(&input.file.content_type.as_str()) {
            return Err(CatalogError::Validation(
                "Book file must be a PDF or EPUB".into(),
            ));
        }
        if input.file.bytes.is_empty() {
            return Err(CatalogError::Validation("Book file is empty".into()));
        }
        if input.file.bytes.len() > self.config.max_book_file_bytes {
            return Err(CatalogError::Validation(format!(
                "Book file exceeds the {} MB limit",
                self.config.max_book_file_bytes / (1024 * 1024)
            )));
        }

        if let Some(cover) = &input.cover {
            if !COVER_TYPES.contains(&cover.content_type.as_str()) {
                return Err(CatalogError::Validation(
                    "Cover image must be JPEG, PNG, or WebP".into(),
                ));
            }
            if cover.bytes.len() > self.config.max_cover_bytes {
                return Err(CatalogError::Validation(format!(
                    "Cover image exceeds the {} MB limit",
                    self.config.max_cover_bytes / (1024 * 1024)
                )));
            }
        }

        Ok(())
    }

    /// Delete blobs written before a failed step
    ///
    /// A failed rollback delete leaves an orphan; that is logged loudly
    /// but cannot change the error the caller gets.
    async fn rollback(&self, keys: &[&str]) {
        for key in keys {
            if let Err(e) = self.objects.delete(key).await {
                tracing::error!(key, error = %e, "Rollback delete failed, blob orphaned");
            }
        }
    }

    pub async fn execute(&self, identity: &Identity, input: UploadInput) -> CatalogResult<Book> {
        self.validate(&input)?;

        let author = self
            .authors
            .find_by_user_id(&identity.user_id)
            .await?
            .ok_or_else(|| CatalogError::Forbidden("An author profile is required".into()))?;

        if !author.can_publish() {
            return Err(CatalogError::Forbidden(
                "Author is not approved or is disabled".into(),
            ));
        }

        // Keys derive from the id, so the id is generated before the record.
        let book_id = BookId::new();
        let file_key = format!("books/{}/{}", book_id, sanitize_filename(&input.file.filename));
        let cover_key = input
            .cover
            .as_ref()
            .map(|c| format!("covers/{}/{}", book_id, sanitize_filename(&c.filename)));

        self.objects.put(&file_key, &input.file.bytes).await?;

        if let (Some(cover), Some(cover_key)) = (&input.cover, &cover_key) {
            if let Err(e) = self.objects.put(cover_key, &cover.bytes).await {
                self.rollback(&[&file_key]).await;
                return Err(e.into());
            }
        }

        let book = Book::new(
            book_id,
            author.author_id,
            BookContent {
                title: input.title.trim().to_string(),
                description: input.description,
                category: input.category.trim().to_string(),
                language: input.language,
                price: input.price,
                rental_price: input.rental_price,
                tags: input.tags,
            },
            file_key.clone(),
            cover_key.clone(),
        );

        if let Err(e) = self.books.create(&book).await {
            let mut keys = vec![file_key.as_str()];
            if let Some(cover_key) = &cover_key {
                keys.push(cover_key.as_str());
            }
            self.rollback(&keys).await;
            return Err(e);
        }

        // New drafts affect the admin-facing pending list.
        self.cache.invalidate_namespace(cache_keys::BOOKS_LIST).await;

        tracing::info!(book = %book.public_id, author = %author.public_id, "Book uploaded");
        Ok(book)
    }
}
