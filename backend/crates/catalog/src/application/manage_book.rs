//! Book Management (author/admin)
//!
//! Content edits and deletion, with ownership enforcement: the owning
//! author or an admin. Deletion removes the database row first, then
//! the blobs; a failed blob delete is logged, since the row is already
//! gone and the delete cannot be observed as half-done by readers.

use std::sync::Arc;

use kernel::identity::Identity;
use platform::cache::CacheStore;
use platform::object::ObjectStore;

use crate::application::cache_keys;
use crate::domain::entity::book::{Book, BookContent};
use crate::domain::repository::{AuthorRepository, BookRepository};
use crate::error::{CatalogError, CatalogResult};

/// Content fields an author may edit
#[derive(Debug, Clone)]
pub struct UpdateBookInput {
    pub title: String,
    pub description: String,
    pub category: String,
    pub language: String,
    pub price: f64,
    pub rental_price: Option<f64>,
    pub tags: Vec<String>,
}

/// Book management use case
pub struct ManageBookUseCase<A, B>
where
    A: AuthorRepository,
    B: BookRepository,
{
    authors: Arc<A>,
    books: Arc<B>,
    objects: Arc<dyn ObjectStore>,
    cache: Arc<dyn CacheStore>,
}

impl<A, B> ManageBookUseCase<A, B>
where
    A: AuthorRepository,
    B: BookRepository,
{
    pub fn new(
        authors: Arc<A>,
        books: Arc<B>,
        objects: Arc<dyn ObjectStore>,
        cache: Arc<dyn CacheStore>,
    ) -> Self {
        Self {
            authors,
            books,
            objects,
            cache,
        }
    }

    /// Owner-or-admin check
    async fn authorize(&self, identity: &Identity, book: &Book) -> CatalogResult<()> {
        if identity.role.is_admin() {
            return Ok(());
        }

        let owns = self
            .authors
            .find_by_user_id(&identity.user_id)
            .await?
            .is_some_and(|author| author.author_id == book.author_id);

        if owns {
            Ok(())
        } else {
            Err(CatalogError::Forbidden(
                "Only the owning author or an admin may modify this book".into(),
            ))
        }
    }

    async fn invalidate(&self, public_id: &str) {
        self.cache.invalidate_namespace(cache_keys::BOOKS_LIST).await;
        self.cache
            .invalidate_namespace(cache_keys::BOOKS_FEATURED)
            .await;
        self.cache.delete(cache_keys::BOOKS_DETAIL, public_id).await;
    }

    /// Edit content fields
    pub async fn update(
        &self,
        identity: &Identity,
        public_id: &str,
        input: UpdateBookInput,
    ) -> CatalogResult<Book> {
        if input.title.trim().is_empty() {
            return Err(CatalogError::Validation("Title is required".into()));
        }
        if input.category.trim().is_empty() {
            return Err(CatalogError::Validation("Category is required".into()));
        }
        if !input.price.is_finite() || input.price < 0.0 {
            return Err(CatalogError::Validation(
                "Price must be a non-negative number".into(),
            ));
        }

        let mut book = self
            .books
            .find_by_public_id(public_id)
            .await?
            .ok_or(CatalogError::NotFound("Book"))?;

        self.authorize(identity, &book).await?;

        book.update_content(BookContent {
            title: input.title.trim().to_string(),
            description: input.description,
            category: input.category.trim().to_string(),
            language: input.language,
            price: input.price,
            rental_price: input.rental_price,
            tags: input.tags,
        });
        self.books.update(&book).await?;
        self.invalidate(public_id).await;

        Ok(book)
    }

    /// Delete a book and its blobs
    pub async fn delete(&self, identity: &Identity, public_id: &str) -> CatalogResult<()> {
        let book = self
            .books
            .find_by_public_id(public_id)
            .await?
            .ok_or(CatalogError::NotFound("Book"))?;

        self.authorize(identity, &book).await?;

        if !self.books.delete(&book.book_id).await? {
            return Err(CatalogError::NotFound("Book"));
        }

        // Row is gone; blob deletes can only orphan storage, not state.
        for key in std::iter::once(&book.file_key).chain(book.cover_key.iter()) {
            if let Err(e) = self.objects.delete(key).await {
                tracing::error!(key, error = %e, "Blob delete failed after row delete");
            }
        }

        self.invalidate(public_id).await;

        tracing::info!(book = %book.public_id, "Book deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FlakyObjectStore, InMemoryCatalog, approved_author, draft_book};
    use kernel::id::Id;
    use kernel::identity::Role;
    use platform::cache::MemoryCacheStore;

    fn fixtures() -> (
        Arc<InMemoryCatalog>,
        Arc<FlakyObjectStore>,
        ManageBookUseCase<InMemoryCatalog, InMemoryCatalog>,
    ) {
        let repo = Arc::new(InMemoryCatalog::default());
        let objects = Arc::new(FlakyObjectStore::new());
        let use_case = ManageBookUseCase::new(
            repo.clone(),
            repo.clone(),
            objects.clone(),
            Arc::new(MemoryCacheStore::new()),
        );
        (repo, objects, use_case)
    }

    fn update_input() -> UpdateBookInput {
        UpdateBookInput {
            title: "Renamed".into(),
            description: "New description".into(),
            category: "Fiction".into(),
            language: "en".into(),
            price: 4.99,
            rental_price: None,
            tags: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_owner_can_update() {
        let (repo, _, use_case) = fixtures();
        let author = approved_author(&repo);
        let book = draft_book(&repo, &author, "Original", "Fiction");
        let identity = Identity::new(author.user_id, Role::Author, Id::new());

        let updated = use_case
            .update(&identity, &book.public_id.to_string(), update_input())
            .await
            .unwrap();
        assert_eq!(updated.content.title, "Renamed");
    }

    #[tokio::test]
    async fn test_non_owner_is_forbidden() {
        let (repo, _, use_case) = fixtures();
        let author = approved_author(&repo);
        let book = draft_book(&repo, &author, "Original", "Fiction");
        let stranger = Identity::new(Id::new(), Role::Author, Id::new());

        assert!(matches!(
            use_case
                .update(&stranger, &book.public_id.to_string(), update_input())
                .await,
            Err(CatalogError::Forbidden(_))
        ));

        assert!(matches!(
            use_case.delete(&stranger, &book.public_id.to_string()).await,
            Err(CatalogError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_admin_can_delete_and_blobs_go_too() {
        let (repo, objects, use_case) = fixtures();
        let author = approved_author(&repo);
        let book = draft_book(&repo, &author, "Original", "Fiction");
        objects.put(&book.file_key, b"%PDF").await.unwrap();
        let admin = Identity::new(Id::new(), Role::Admin, Id::new());

        use_case
            .delete(&admin, &book.public_id.to_string())
            .await
            .unwrap();

        assert!(repo.get_book(&book.book_id).is_none());
        assert!(objects.live_keys().is_empty());
    }
}
