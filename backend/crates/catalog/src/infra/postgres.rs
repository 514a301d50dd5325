//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use nid::Nanoid;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::str::FromStr;
use uuid::Uuid;

use auth::models::public_id::PublicId;
use kernel::id::{AuthorId, BookId, UserId};

use crate::domain::entity::author::{Author, AuthorProfile};
use crate::domain::entity::book::{Book, BookContent};
use crate::domain::repository::{
    AuthorListFilter, AuthorRepository, BookListFilter, BookRepository, BookWithAuthor,
};
use crate::domain::value_object::AuthorStatus;
use crate::error::{CatalogError, CatalogResult};

const AUTHOR_COLUMNS: &str = r#"
    author_id,
    user_id,
    public_id,
    pen_name,
    bio,
    contact_email,
    location,
    background,
    genres,
    languages,
    payment_method,
    payment_details,
    social_links,
    status,
    is_active,
    rejection_reason,
    applied_at,
    approved_at,
    created_at,
    updated_at
"#;

const BOOK_JOIN_COLUMNS: &str = r#"
    b.book_id,
    b.public_id,
    b.author_id,
    b.title,
    b.description,
    b.category,
    b.language,
    b.price,
    b.rental_price,
    b.tags,
    b.file_key,
    b.cover_key,
    b.is_published,
    b.published_at,
    b.is_active,
    b.is_featured,
    b.featured_order,
    b.created_at,
    b.updated_at,
    a.public_id AS author_public_id,
    a.pen_name AS author_name
"#;

/// PostgreSQL-backed catalog repository
#[derive(Clone)]
pub struct PgCatalogRepository {
    pool: PgPool,
}

impl PgCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl AuthorRepository for PgCatalogRepository {
    async fn create(&self, author: &Author) -> CatalogResult<()> {
        sqlx::query(
            r#"
            INSERT INTO authors (
                author_id,
                user_id,
                public_id,
                pen_name,
                bio,
                contact_email,
                location,
                background,
                genres,
                languages,
                payment_method,
                payment_details,
                social_links,
                status,
                is_active,
                rejection_reason,
                applied_at,
                approved_at,
                created_at,
                updated_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                $11, $12, $13, $14, $15, $16, $17, $18, $19, $20
            )
            "#,
        )
        .bind(author.author_id.into_uuid())
        .bind(author.user_id.into_uuid())
        .bind(author.public_id.as_str())
        .bind(&author.profile.pen_name)
        .bind(&author.profile.bio)
        .bind(&author.profile.contact_email)
        .bind(author.profile.location.as_deref())
        .bind(author.profile.background.as_deref())
        .bind(&author.profile.genres)
        .bind(&author.profile.languages)
        .bind(author.profile.payment_method.as_deref())
        .bind(author.profile.payment_details.as_deref())
        .bind(&author.profile.social_links)
        .bind(author.status.id())
        .bind(author.is_active)
        .bind(author.rejection_reason.as_deref())
        .bind(author.applied_at)
        .bind(author.approved_at)
        .bind(author.created_at)
        .bind(author.updated_at)
        .execute(&self.pool)
        .await?;

        tracing::info!(author = %author.public_id, "Author application stored");
        Ok(())
    }

    async fn find_by_id(&self, author_id: &AuthorId) -> CatalogResult<Option<Author>> {
        let row = sqlx::query_as::<_, AuthorRow>(&format!(
            "SELECT {AUTHOR_COLUMNS} FROM authors WHERE author_id = $1"
        ))
        .bind(author_id.into_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_author()).transpose()
    }

    async fn find_by_public_id(&self, public_id: &str) -> CatalogResult<Option<Author>> {
        let row = sqlx::query_as::<_, AuthorRow>(&format!(
            "SELECT {AUTHOR_COLUMNS} FROM authors WHERE public_id = $1"
        ))
        .bind(public_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_author()).transpose()
    }

    async fn find_by_user_id(&self, user_id: &UserId) -> CatalogResult<Option<Author>> {
        let row = sqlx::query_as::<_, AuthorRow>(&format!(
            "SELECT {AUTHOR_COLUMNS} FROM authors WHERE user_id = $1"
        ))
        .bind(user_id.into_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_author()).transpose()
    }

    async fn update(&self, author: &Author) -> CatalogResult<()> {
        sqlx::query(
            r#"
            UPDATE authors SET
                pen_name = $2,
                bio = $3,
                contact_email = $4,
                location = $5,
                background = $6,
                genres = $7,
                languages = $8,
                payment_method = $9,
                payment_details = $10,
                social_links = $11,
                status = $12,
                is_active = $13,
                rejection_reason = $14,
                approved_at = $15,
                updated_at = $16
            WHERE author_id = $1
            "#,
        )
        .bind(author.author_id.into_uuid())
        .bind(&author.profile.pen_name)
        .bind(&author.profile.bio)
        .bind(&author.profile.contact_email)
        .bind(author.profile.location.as_deref())
        .bind(author.profile.background.as_deref())
        .bind(&author.profile.genres)
        .bind(&author.profile.languages)
        .bind(author.profile.payment_method.as_deref())
        .bind(author.profile.payment_details.as_deref())
        .bind(&author.profile.social_links)
        .bind(author.status.id())
        .bind(author.is_active)
        .bind(author.rejection_reason.as_deref())
        .bind(author.approved_at)
        .bind(author.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn set_active_cascade(&self, author_id: &AuthorId, active: bool) -> CatalogResult<u64> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE authors SET is_active = $2, updated_at = now() WHERE author_id = $1")
            .bind(author_id.into_uuid())
            .bind(active)
            .execute(&mut *tx)
            .await?;

        // Disabling pulls every owned book offline in the same
        // transaction; re-enabling leaves the books as they are.
        let cascaded = if active {
            0
        } else {
            sqlx::query(
                r#"
                UPDATE books SET is_active = FALSE, updated_at = now()
                WHERE author_id = $1 AND is_active
                "#,
            )
            .bind(author_id.into_uuid())
            .execute(&mut *tx)
            .await?
            .rows_affected()
        };

        tx.commit().await?;

        tracing::info!(author_id = %author_id, active, cascaded, "Author active flag set");
        Ok(cascaded)
    }

    async fn list(&self, filter: &AuthorListFilter) -> CatalogResult<(Vec<Author>, i64)> {
        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {AUTHOR_COLUMNS} FROM authors WHERE TRUE"
        ));
        push_author_filters(&mut query, filter);
        query.push(" ORDER BY created_at DESC, public_id");
        query.push(" LIMIT ").push_bind(i64::from(filter.limit));
        query.push(" OFFSET ").push_bind(filter.offset());

        let rows = query
            .build_query_as::<AuthorRow>()
            .fetch_all(&self.pool)
            .await?;

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM authors WHERE TRUE");
        push_author_filters(&mut count, filter);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let authors = rows
            .into_iter()
            .map(AuthorRow::into_author)
            .collect::<CatalogResult<Vec<_>>>()?;

        Ok((authors, total))
    }
}

impl BookRepository for PgCatalogRepository {
    async fn create(&self, book: &Book) -> CatalogResult<()> {
        sqlx::query(
            r#"
            INSERT INTO books (
                book_id,
                public_id,
                author_id,
                title,
                description,
                category,
                language,
                price,
                rental_price,
                tags,
                file_key,
                cover_key,
                is_published,
                published_at,
                is_active,
                is_featured,
                featured_order,
                created_at,
                updated_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                $11, $12, $13, $14, $15, $16, $17, $18, $19
            )
            "#,
        )
        .bind(book.book_id.into_uuid())
        .bind(book.public_id.as_str())
        .bind(book.author_id.into_uuid())
        .bind(&book.content.title)
        .bind(&book.content.description)
        .bind(&book.content.category)
        .bind(&book.content.language)
        .bind(book.content.price)
        .bind(book.content.rental_price)
        .bind(&book.content.tags)
        .bind(&book.file_key)
        .bind(book.cover_key.as_deref())
        .bind(book.is_published)
        .bind(book.published_at)
        .bind(book.is_active)
        .bind(book.is_featured)
        .bind(book.featured_order)
        .bind(book.created_at)
        .bind(book.updated_at)
        .execute(&self.pool)
        .await?;

        tracing::info!(book = %book.public_id, "Book stored");
        Ok(())
    }

    async fn find_by_id(&self, book_id: &BookId) -> CatalogResult<Option<Book>> {
        let row = sqlx::query_as::<_, BookRow>(
            "SELECT * FROM books WHERE book_id = $1",
        )
        .bind(book_id.into_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_book()).transpose()
    }

    async fn find_by_public_id(&self, public_id: &str) -> CatalogResult<Option<Book>> {
        let row = sqlx::query_as::<_, BookRow>(
            "SELECT * FROM books WHERE public_id = $1",
        )
        .bind(public_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_book()).transpose()
    }

    async fn find_detail_by_public_id(
        &self,
        public_id: &str,
    ) -> CatalogResult<Option<BookWithAuthor>> {
        let row = sqlx::query_as::<_, BookJoinRow>(&format!(
            r#"
            SELECT {BOOK_JOIN_COLUMNS}
            FROM books b
            JOIN authors a ON a.author_id = b.author_id
            WHERE b.public_id = $1
            "#
        ))
        .bind(public_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_book_with_author()).transpose()
    }

    async fn update(&self, book: &Book) -> CatalogResult<()> {
        sqlx::query(
            r#"
            UPDATE books SET
                title = $2,
                description = $3,
                category = $4,
                language = $5,
                price = $6,
                rental_price = $7,
                tags = $8,
                is_published = $9,
                published_at = $10,
                is_active = $11,
                is_featured = $12,
                featured_order = $13,
                updated_at = $14
            WHERE book_id = $1
            "#,
        )
        .bind(book.book_id.into_uuid())
        .bind(&book.content.title)
        .bind(&book.content.description)
        .bind(&book.content.category)
        .bind(&book.content.language)
        .bind(book.content.price)
        .bind(book.content.rental_price)
        .bind(&book.content.tags)
        .bind(book.is_published)
        .bind(book.published_at)
        .bind(book.is_active)
        .bind(book.is_featured)
        .bind(book.featured_order)
        .bind(book.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, book_id: &BookId) -> CatalogResult<bool> {
        let deleted = sqlx::query("DELETE FROM books WHERE book_id = $1")
            .bind(book_id.into_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }

    async fn publish(&self, book_id: &BookId) -> CatalogResult<bool> {
        // Conditional update; a concurrent double-approve affects 0
        // rows on the losing side instead of re-publishing.
        let published = sqlx::query(
            r#"
            UPDATE books
            SET is_published = TRUE, published_at = now(), updated_at = now()
            WHERE book_id = $1 AND NOT is_published
            "#,
        )
        .bind(book_id.into_uuid())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(published > 0)
    }

    async fn max_featured_order(&self) -> CatalogResult<Option<i32>> {
        let max = sqlx::query_scalar::<_, Option<i32>>(
            "SELECT MAX(featured_order) FROM books WHERE is_featured",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(max)
    }

    async fn list(&self, filter: &BookListFilter) -> CatalogResult<(Vec<BookWithAuthor>, i64)> {
        let mut query = QueryBuilder::<Postgres>::new(format!(
            r#"
            SELECT {BOOK_JOIN_COLUMNS}
            FROM books b
            JOIN authors a ON a.author_id = b.author_id
            WHERE TRUE
            "#
        ));
        push_book_filters(&mut query, filter);

        // Curated shelves come back in their pinned order.
        if filter.featured == Some(true) {
            query.push(" ORDER BY b.featured_order ASC, b.created_at DESC");
        } else {
            query.push(" ORDER BY b.created_at DESC, b.public_id");
        }
        query.push(" LIMIT ").push_bind(i64::from(filter.limit));
        query.push(" OFFSET ").push_bind(filter.offset());

        let rows = query
            .build_query_as::<BookJoinRow>()
            .fetch_all(&self.pool)
            .await?;

        let mut count = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM books b JOIN authors a ON a.author_id = b.author_id WHERE TRUE",
        );
        push_book_filters(&mut count, filter);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let books = rows
            .into_iter()
            .map(BookJoinRow::into_book_with_author)
            .collect::<CatalogResult<Vec<_>>>()?;

        Ok((books, total))
    }

    async fn purge_expired_rentals(&self) -> CatalogResult<u64> {
        let purged = sqlx::query("DELETE FROM book_rentals WHERE expires_at < now()")
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(purged)
    }
}

fn push_author_filters(query: &mut QueryBuilder<'_, Postgres>, filter: &AuthorListFilter) {
    if let Some(search) = &filter.search {
        query
            .push(" AND pen_name ILIKE ")
            .push_bind(format!("%{}%", search));
    }
    if let Some(status) = filter.status {
        query.push(" AND status = ").push_bind(status.id());
    }
    if filter.active_only {
        query.push(" AND is_active");
    }
}

fn push_book_filters(query: &mut QueryBuilder<'_, Postgres>, filter: &BookListFilter) {
    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", search);
        query
            .push(" AND (b.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR b.description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(category) = &filter.category {
        query.push(" AND b.category = ").push_bind(category.clone());
    }
    if let Some(author_id) = filter.author_id {
        query
            .push(" AND b.author_id = ")
            .push_bind(author_id.into_uuid());
    }
    if let Some(featured) = filter.featured {
        query.push(" AND b.is_featured = ").push_bind(featured);
    }
    if let Some(published) = filter.published {
        query.push(" AND b.is_published = ").push_bind(published);
    }
    if filter.active_only {
        query.push(" AND b.is_active");
    }
}

fn parse_public_id(s: &str) -> CatalogResult<PublicId> {
    Nanoid::from_str(s)
        .map(PublicId)
        .map_err(|e| CatalogError::Internal(format!("Corrupt public id in store: {}", e)))
}

// Internal row types for sqlx mapping
#[derive(sqlx::FromRow)]
struct AuthorRow {
    author_id: Uuid,
    user_id: Uuid,
    public_id: String,
    pen_name: String,
    bio: String,
    contact_email: String,
    location: Option<String>,
    background: Option<String>,
    genres: Vec<String>,
    languages: Vec<String>,
    payment_method: Option<String>,
    payment_details: Option<String>,
    social_links: Vec<String>,
    status: i16,
    is_active: bool,
    rejection_reason: Option<String>,
    applied_at: DateTime<Utc>,
    approved_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AuthorRow {
    fn into_author(self) -> CatalogResult<Author> {
        let status = AuthorStatus::from_id(self.status).ok_or_else(|| {
            CatalogError::Internal(format!("Unknown author status in store: {}", self.status))
        })?;

        Ok(Author {
            author_id: AuthorId::from_uuid(self.author_id),
            user_id: UserId::from_uuid(self.user_id),
            public_id: parse_public_id(&self.public_id)?,
            profile: AuthorProfile {
                pen_name: self.pen_name,
                bio: self.bio,
                contact_email: self.contact_email,
                location: self.location,
                background: self.background,
                genres: self.genres,
                languages: self.languages,
                payment_method: self.payment_method,
                payment_details: self.payment_details,
                social_links: self.social_links,
            },
            status,
            is_active: self.is_active,
            rejection_reason: self.rejection_reason,
            applied_at: self.applied_at,
            approved_at: self.approved_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct BookRow {
    book_id: Uuid,
    public_id: String,
    author_id: Uuid,
    title: String,
    description: String,
    category: String,
    language: String,
    price: f64,
    rental_price: Option<f64>,
    tags: Vec<String>,
    file_key: String,
    cover_key: Option<String>,
    is_published: bool,
    published_at: Option<DateTime<Utc>>,
    is_active: bool,
    is_featured: bool,
    featured_order: Option<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl BookRow {
    fn into_book(self) -> CatalogResult<Book> {
        Ok(Book {
            book_id: BookId::from_uuid(self.book_id),
            public_id: parse_public_id(&self.public_id)?,
            author_id: AuthorId::from_uuid(self.author_id),
            content: BookContent {
                title: self.title,
                description: self.description,
                category: self.category,
                language: self.language,
                price: self.price,
                rental_price: self.rental_price,
                tags: self.tags,
            },
            file_key: self.file_key,
            cover_key: self.cover_key,
            is_published: self.is_published,
            published_at: self.published_at,
            is_active: self.is_active,
            is_featured: self.is_featured,
            featured_order: self.featured_order,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct BookJoinRow {
    #[sqlx(flatten)]
    book: BookRow,
    author_public_id: String,
    author_name: String,
}

impl BookJoinRow {
    fn into_book_with_author(self) -> CatalogResult<BookWithAuthor> {
        Ok(BookWithAuthor {
            book: self.book.into_book()?,
            author_public_id: self.author_public_id,
            author_name: self.author_name,
        })
    }
}
