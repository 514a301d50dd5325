//! In-memory fakes and fixtures for use-case tests.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use kernel::id::{AuthorId, BookId, UserId};

use crate::domain::entity::author::{Author, AuthorProfile};
use crate::domain::entity::book::{Book, BookContent};
use crate::domain::repository::{
    AuthorListFilter, AuthorRepository, BookListFilter, BookRepository, BookWithAuthor,
};
use crate::error::{CatalogError, CatalogResult};

/// Mutex-backed author and book tables
#[derive(Default)]
pub struct InMemoryCatalog {
    authors: Mutex<HashMap<AuthorId, Author>>,
    books: Mutex<HashMap<BookId, Book>>,
    rentals: Mutex<Vec<DateTime<Utc>>>,
    /// When set, every book insert fails (upload rollback tests)
    pub fail_book_insert: std::sync::atomic::AtomicBool,
}

impl InMemoryCatalog {
    pub fn insert_author(&self, author: Author) {
        self.authors
            .lock()
            .unwrap()
            .insert(author.author_id, author);
    }

    pub fn insert_book(&self, book: Book) {
        self.books.lock().unwrap().insert(book.book_id, book);
    }

    pub fn get_author(&self, author_id: &AuthorId) -> Option<Author> {
        self.authors.lock().unwrap().get(author_id).cloned()
    }

    pub fn get_book(&self, book_id: &BookId) -> Option<Book> {
        self.books.lock().unwrap().get(book_id).cloned()
    }

    pub fn books_of(&self, author_id: &AuthorId) -> Vec<Book> {
        self.books
            .lock()
            .unwrap()
            .values()
            .filter(|b| b.author_id == *author_id)
            .cloned()
            .collect()
    }

    pub fn add_rental(&self, expires_at: DateTime<Utc>) {
        self.rentals.lock().unwrap().push(expires_at);
    }

    fn join_author(&self, book: &Book) -> BookWithAuthor {
        let authors = self.authors.lock().unwrap();
        let author = authors
            .get(&book.author_id)
            .expect("book references a missing author");
        BookWithAuthor {
            book: book.clone(),
            author_public_id: author.public_id.to_string(),
            author_name: author.profile.pen_name.clone(),
        }
    }

    fn matches(book: &Book, filter: &BookListFilter) -> bool {
        if let Some(published) = filter.published {
            if book.is_published != published {
                return false;
            }
        }
        if filter.active_only && !book.is_active {
            return false;
        }
        if let Some(category) = &filter.category {
            if &book.content.category != category {
                return false;
            }
        }
        if let Some(author_id) = &filter.author_id {
            if &book.author_id != author_id {
                return false;
            }
        }
        if let Some(featured) = filter.featured {
            if book.is_featured != featured {
                return false;
            }
        }
        if let Some(search) = &filter.search {
            if !book
                .content
                .title
                .to_lowercase()
                .contains(&search.to_lowercase())
            {
                return false;
            }
        }
        true
    }
}

impl AuthorRepository for InMemoryCatalog {
    async fn create(&self, author: &Author) -> CatalogResult<()> {
        self.insert_author(author.clone());
        Ok(())
    }

    async fn find_by_id(&self, author_id: &AuthorId) -> CatalogResult<Option<Author>> {
        Ok(self.get_author(author_id))
    }

    async fn find_by_public_id(&self, public_id: &str) -> CatalogResult<Option<Author>> {
        Ok(self
            .authors
            .lock()
            .unwrap()
            .values()
            .find(|a| a.public_id.as_str() == public_id)
            .cloned())
    }

    async fn find_by_user_id(&self, user_id: &UserId) -> CatalogResult<Option<Author>> {
        Ok(self
            .authors
            .lock()
            .unwrap()
            .values()
            .find(|a| a.user_id == *user_id)
            .cloned())
    }

    async fn update(&self, author: &Author) -> CatalogResult<()> {
        self.insert_author(author.clone());
        Ok(())
    }

    async fn set_active_cascade(&self, author_id: &AuthorId, active: bool) -> CatalogResult<u64> {
        let mut authors = self.authors.lock().unwrap();
        let author = authors
            .get_mut(author_id)
            .ok_or(CatalogError::NotFound("Author"))?;
        author.is_active = active;
        author.updated_at = Utc::now();

        if active {
            return Ok(0);
        }

        let mut cascaded = 0;
        for book in self.books.lock().unwrap().values_mut() {
            if book.author_id == *author_id && book.is_active {
                book.is_active = false;
                cascaded += 1;
            }
        }
        Ok(cascaded)
    }

    async fn list(&self, filter: &AuthorListFilter) -> CatalogResult<(Vec<Author>, i64)> {
        let authors = self.authors.lock().unwrap();
        let mut rows: Vec<Author> = authors
            .values()
            .filter(|a| {
                if filter.active_only && !a.is_active {
                    return false;
                }
                if let Some(status) = filter.status {
                    if a.status != status {
                        return false;
                    }
                }
                if let Some(search) = &filter.search {
                    if !a
                        .profile
                        .pen_name
                        .to_lowercase()
                        .contains(&search.to_lowercase())
                    {
                        return false;
                    }
                }
                true
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.applied_at.cmp(&b.applied_at));

        let total = rows.len() as i64;
        let rows = rows
            .into_iter()
            .skip(filter.offset() as usize)
            .take(filter.limit as usize)
            .collect();
        Ok((rows, total))
    }
}

impl BookRepository for InMemoryCatalog {
    async fn create(&self, book: &Book) -> CatalogResult<()> {
        if self
            .fail_book_insert
            .load(std::sync::atomic::Ordering::SeqCst)
        {
            return Err(CatalogError::Database(sqlx::Error::PoolClosed));
        }
        self.insert_book(book.clone());
        Ok(())
    }

    async fn find_by_id(&self, book_id: &BookId) -> CatalogResult<Option<Book>> {
        Ok(self.get_book(book_id))
    }

    async fn find_by_public_id(&self, public_id: &str) -> CatalogResult<Option<Book>> {
        Ok(self
            .books
            .lock()
            .unwrap()
            .values()
            .find(|b| b.public_id.as_str() == public_id)
            .cloned())
    }

    async fn find_detail_by_public_id(
        &self,
        public_id: &str,
    ) -> CatalogResult<Option<BookWithAuthor>> {
        let book = BookRepository::find_by_public_id(self, public_id).await?;
        Ok(book.map(|b| self.join_author(&b)))
    }

    async fn update(&self, book: &Book) -> CatalogResult<()> {
        self.insert_book(book.clone());
        Ok(())
    }

    async fn delete(&self, book_id: &BookId) -> CatalogResult<bool> {
        Ok(self.books.lock().unwrap().remove(book_id).is_some())
    }

    async fn publish(&self, book_id: &BookId) -> CatalogResult<bool> {
        let mut books = self.books.lock().unwrap();
        match books.get_mut(book_id) {
            Some(book) if !book.is_published => {
                book.is_published = true;
                book.published_at = Some(Utc::now());
                book.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn max_featured_order(&self) -> CatalogResult<Option<i32>> {
        Ok(self
            .books
            .lock()
            .unwrap()
            .values()
            .filter(|b| b.is_featured)
            .filter_map(|b| b.featured_order)
            .max())
    }

    async fn list(&self, filter: &BookListFilter) -> CatalogResult<(Vec<BookWithAuthor>, i64)> {
        let mut rows: Vec<Book> = {
            let books = self.books.lock().unwrap();
            books
                .values()
                .filter(|b| Self::matches(b, filter))
                .cloned()
                .collect()
        };
        rows.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.public_id.as_str().cmp(b.public_id.as_str()))
        });

        let total = rows.len() as i64;
        let rows = rows
            .into_iter()
            .skip(filter.offset() as usize)
            .take(filter.limit as usize)
            .map(|b| self.join_author(&b))
            .collect();
        Ok((rows, total))
    }

    async fn purge_expired_rentals(&self) -> CatalogResult<u64> {
        let mut rentals = self.rentals.lock().unwrap();
        let before = rentals.len();
        let now = Utc::now();
        rentals.retain(|expires_at| *expires_at > now);
        Ok((before - rentals.len()) as u64)
    }
}

// ============================================================================
// In-memory user repository (auth contract)
// ============================================================================

/// Mutex-backed user table implementing the auth repository contract
#[derive(Default)]
pub struct InMemoryUsers {
    users: Mutex<HashMap<UserId, auth::models::user::User>>,
}

impl InMemoryUsers {
    pub fn insert(&self, user: auth::models::user::User) {
        self.users.lock().unwrap().insert(user.user_id, user);
    }

    pub fn get(&self, user_id: &UserId) -> Option<auth::models::user::User> {
        self.users.lock().unwrap().get(user_id).cloned()
    }
}

impl auth::domain::repository::UserRepository for InMemoryUsers {
    async fn create(&self, user: &auth::models::user::User) -> auth::AuthResult<()> {
        self.insert(user.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        user_id: &UserId,
    ) -> auth::AuthResult<Option<auth::models::user::User>> {
        Ok(self.get(user_id))
    }

    async fn find_by_email(
        &self,
        email: &auth::models::email::Email,
    ) -> auth::AuthResult<Option<auth::models::user::User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email.as_str() == email.as_str())
            .cloned())
    }

    async fn exists_by_email(&self, email: &auth::models::email::Email) -> auth::AuthResult<bool> {
        Ok(self.find_by_email(email).await?.is_some())
    }

    async fn update(&self, user: &auth::models::user::User) -> auth::AuthResult<()> {
        self.insert(user.clone());
        Ok(())
    }
}

/// Insert a reader account and return an identity for it
pub fn reader_identity(users: &InMemoryUsers) -> kernel::identity::Identity {
    let user = auth::models::user::User::new(
        auth::models::email::Email::new("reader@example.com").unwrap(),
        auth::models::display_name::DisplayName::new("Reader").unwrap(),
        None,
    );
    let identity = kernel::identity::Identity::new(
        user.user_id,
        kernel::identity::Role::Reader,
        kernel::id::Id::new(),
    );
    users.insert(user);
    identity
}

/// A valid author-application input
pub fn profile_input(pen_name: &str) -> crate::application::AuthorProfileInput {
    crate::application::AuthorProfileInput {
        pen_name: pen_name.into(),
        bio: "Writes books".into(),
        contact_email: "writer@example.com".into(),
        ..Default::default()
    }
}

// ============================================================================
// Flaky object store
// ============================================================================

/// Object store wrapper that fails puts on keys containing a marker
/// and tracks the set of live keys for orphan assertions
pub struct FlakyObjectStore {
    inner: platform::object::MemoryObjectStore,
    live: Mutex<std::collections::HashSet<String>>,
    fail_puts_containing: Mutex<Option<String>>,
}

impl FlakyObjectStore {
    pub fn new() -> Self {
        Self {
            inner: platform::object::MemoryObjectStore::new(),
            live: Mutex::new(std::collections::HashSet::new()),
            fail_puts_containing: Mutex::new(None),
        }
    }

    pub fn fail_puts_containing(&self, marker: &str) {
        *self.fail_puts_containing.lock().unwrap() = Some(marker.to_string());
    }

    pub fn live_keys(&self) -> Vec<String> {
        self.live.lock().unwrap().iter().cloned().collect()
    }
}

#[async_trait::async_trait]
impl platform::object::ObjectStore for FlakyObjectStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> platform::object::ObjectStoreResult<()> {
        if let Some(marker) = self.fail_puts_containing.lock().unwrap().clone() {
            if key.contains(&marker) {
                return Err(platform::object::ObjectStoreError::Io(
                    std::io::Error::other("injected put failure"),
                ));
            }
        }
        self.inner.put(key, bytes).await?;
        self.live.lock().unwrap().insert(key.to_string());
        Ok(())
    }

    async fn get(&self, key: &str) -> platform::object::ObjectStoreResult<Option<Vec<u8>>> {
        self.inner.get(key).await
    }

    async fn delete(&self, key: &str) -> platform::object::ObjectStoreResult<()> {
        self.inner.delete(key).await?;
        self.live.lock().unwrap().remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> platform::object::ObjectStoreResult<bool> {
        self.inner.exists(key).await
    }
}

// ============================================================================
// Recording notifier
// ============================================================================

/// Records delivered messages; can be flipped into failure mode
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<platform::notify::EmailMessage>>,
    fail: std::sync::atomic::AtomicBool,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<platform::notify::EmailMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, std::sync::atomic::Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl platform::notify::EmailNotifier for RecordingNotifier {
    async fn send(
        &self,
        message: platform::notify::EmailMessage,
    ) -> Result<(), platform::notify::NotifyError> {
        if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(platform::notify::NotifyError::Rejected(502));
        }
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

// ============================================================================
// Fixtures
// ============================================================================

pub fn profile(pen_name: &str) -> AuthorProfile {
    AuthorProfile {
        pen_name: pen_name.into(),
        bio: "Writes books".into(),
        contact_email: format!("{}@example.com", pen_name.to_lowercase().replace(' ', ".")),
        ..Default::default()
    }
}

/// Insert an approved, active author
pub fn approved_author(repo: &InMemoryCatalog) -> Author {
    let mut author = Author::new(kernel::id::Id::new(), profile("Le Guin"));
    author.approve();
    repo.insert_author(author.clone());
    author
}

/// Insert a pending author application
pub fn pending_author(repo: &InMemoryCatalog) -> Author {
    let author = Author::new(kernel::id::Id::new(), profile("Applicant"));
    repo.insert_author(author.clone());
    author
}

/// Insert an unpublished, active book owned by the author
pub fn draft_book(repo: &InMemoryCatalog, author: &Author, title: &str, category: &str) -> Book {
    let book = Book::new(
        kernel::id::Id::new(),
        author.author_id,
        BookContent {
            title: title.into(),
            description: "A book".into(),
            category: category.into(),
            language: "en".into(),
            price: 9.99,
            rental_price: None,
            tags: Vec::new(),
        },
        format!("books/{}/file.pdf", title.to_lowercase().replace(' ', "-")),
        None,
    );
    repo.insert_book(book.clone());
    book
}

/// Insert a published, active book owned by the author
pub fn published_book(
    repo: &InMemoryCatalog,
    author: &Author,
    title: &str,
    category: &str,
) -> Book {
    let mut book = draft_book(repo, author, title, category);
    book.is_published = true;
    book.published_at = Some(Utc::now());
    repo.insert_book(book.clone());
    book
}
