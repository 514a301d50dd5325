//! HTTP Handlers
//!
//! Browse routes run behind the optional auth gate: anonymous traffic
//! sees only publicly visible rows, while an admin carrying
//! credentials can request hidden rows with `includeHidden=true`.
//! Mutating routes sit behind the mandatory gate.

use axum::Json;
use axum::extract::{Extension, Multipart, Path, Query, State};
use axum::http::StatusCode;
use std::sync::Arc;

use kernel::identity::Identity;
use kernel::response::ApiResponse;
use platform::cache::CacheStore;
use platform::notify::EmailNotifier;
use platform::object::ObjectStore;

use auth::domain::repository::UserRepository;

use crate::application::browse::{AuthorView, BookView, Page};
use crate::application::manage_book::UpdateBookInput;
use crate::application::{
    ApplyAuthorUseCase, BrowseUseCase, CatalogConfig, FilePart, ManageBookUseCase,
    ModerateAuthorsUseCase, ModerateBooksUseCase, UploadBookUseCase, UploadInput,
};
use crate::domain::repository::{AuthorRepository, BookRepository};
use crate::error::{CatalogError, CatalogResult};
use crate::presentation::dto::{
    ApproveAuthorRequest, ApproveBookRequest, AuthorApplicationRequest, AuthorListQuery,
    BookListQuery, FeatureBookRequest, FeaturedOrderRequest, RejectAuthorRequest,
    RejectBookRequest, ToggleAuthorRequest, ToggleBookRequest, UpdateBookRequest,
};

/// Shared state for catalog handlers
pub struct CatalogAppState<A, B, U>
where
    A: AuthorRepository + Send + Sync + 'static,
    B: BookRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    pub authors: Arc<A>,
    pub books: Arc<B>,
    pub users: Arc<U>,
    pub objects: Arc<dyn ObjectStore>,
    pub cache: Arc<dyn CacheStore>,
    pub notifier: Arc<dyn EmailNotifier>,
    pub config: Arc<CatalogConfig>,
}

impl<A, B, U> Clone for CatalogAppState<A, B, U>
where
    A: AuthorRepository + Send + Sync + 'static,
    B: BookRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            authors: self.authors.clone(),
            books: self.books.clone(),
            users: self.users.clone(),
            objects: self.objects.clone(),
            cache: self.cache.clone(),
            notifier: self.notifier.clone(),
            config: self.config.clone(),
        }
    }
}

impl<A, B, U> CatalogAppState<A, B, U>
where
    A: AuthorRepository + Send + Sync + 'static,
    B: BookRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    fn browse(&self) -> BrowseUseCase<A, B> {
        BrowseUseCase::new(
            self.authors.clone(),
            self.books.clone(),
            self.cache.clone(),
            self.config.clone(),
        )
    }
}

fn is_admin(identity: &Option<Extension<Identity>>) -> bool {
    identity.as_ref().is_some_and(|i| i.role.is_admin())
}

// ============================================================================
// Browsing
// ============================================================================

/// GET /api/books
pub async fn list_books<A, B, U>(
    State(state): State<CatalogAppState<A, B, U>>,
    identity: Option<Extension<Identity>>,
    Query(query): Query<BookListQuery>,
) -> CatalogResult<Json<ApiResponse<Page<BookView>>>>
where
    A: AuthorRepository + Send + Sync + 'static,
    B: BookRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    let author_public_id = query.author_id.clone();
    let mut filter = query.into_filter(is_admin(&identity));

    if let Some(public_id) = author_public_id.filter(|a| !a.trim().is_empty()) {
        let author = state
            .authors
            .find_by_public_id(&public_id)
            .await?
            .ok_or(CatalogError::NotFound("Author"))?;
        filter.author_id = Some(author.author_id);
    }

    let page = state.browse().list_books(&filter).await?;

    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/books/{id}
///
/// Drafts and deactivated books resolve for admins and the owning
/// author only; everyone else gets the same 404 as a missing id.
pub async fn get_book<A, B, U>(
    State(state): State<CatalogAppState<A, B, U>>,
    identity: Option<Extension<Identity>>,
    Path(public_id): Path<String>,
) -> CatalogResult<Json<ApiResponse<BookView>>>
where
    A: AuthorRepository + Send + Sync + 'static,
    B: BookRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    let view = state
        .browse()
        .get_book(&public_id)
        .await?
        .ok_or(CatalogError::NotFound("Book"))?;

    if !(view.is_published && view.is_active) {
        let allowed = match &identity {
            Some(Extension(i)) if i.role.is_admin() => true,
            Some(Extension(i)) => state
                .authors
                .find_by_user_id(&i.user_id)
                .await?
                .is_some_and(|author| author.public_id.to_string() == view.author_id),
            None => false,
        };
        if !allowed {
            return Err(CatalogError::NotFound("Book"));
        }
    }

    Ok(Json(ApiResponse::ok(view)))
}

/// GET /api/authors
pub async fn list_authors<A, B, U>(
    State(state): State<CatalogAppState<A, B, U>>,
    identity: Option<Extension<Identity>>,
    Query(query): Query<AuthorListQuery>,
) -> CatalogResult<Json<ApiResponse<Page<AuthorView>>>>
where
    A: AuthorRepository + Send + Sync + 'static,
    B: BookRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    let filter = query.into_filter(is_admin(&identity));
    let page = state.browse().list_authors(&filter).await?;

    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/authors/{id}
pub async fn get_author<A, B, U>(
    State(state): State<CatalogAppState<A, B, U>>,
    Path(public_id): Path<String>,
) -> CatalogResult<Json<ApiResponse<AuthorView>>>
where
    A: AuthorRepository + Send + Sync + 'static,
    B: BookRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    let view = state
        .browse()
        .get_author(&public_id)
        .await?
        .ok_or(CatalogError::NotFound("Author"))?;

    Ok(Json(ApiResponse::ok(view)))
}

// ============================================================================
// Author self-service
// ============================================================================

/// POST /api/authors/apply
pub async fn apply_author<A, B, U>(
    State(state): State<CatalogAppState<A, B, U>>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<AuthorApplicationRequest>,
) -> CatalogResult<(StatusCode, Json<ApiResponse<AuthorView>>)>
where
    A: AuthorRepository + Send + Sync + 'static,
    B: BookRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    let use_case = ApplyAuthorUseCase::new(
        state.authors.clone(),
        state.users.clone(),
        state.cache.clone(),
    );
    let author = use_case.execute(&identity, req.into()).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(AuthorView::from(&author))),
    ))
}

/// GET /api/authors/me
pub async fn my_author_profile<A, B, U>(
    State(state): State<CatalogAppState<A, B, U>>,
    Extension(identity): Extension<Identity>,
) -> CatalogResult<Json<ApiResponse<AuthorView>>>
where
    A: AuthorRepository + Send + Sync + 'static,
    B: BookRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    let author = state
        .authors
        .find_by_user_id(&identity.user_id)
        .await?
        .ok_or(CatalogError::NotFound("Author"))?;

    Ok(Json(ApiResponse::ok(AuthorView::from(&author))))
}

/// PUT /api/authors/me
pub async fn update_author_profile<A, B, U>(
    State(state): State<CatalogAppState<A, B, U>>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<AuthorApplicationRequest>,
) -> CatalogResult<Json<ApiResponse<AuthorView>>>
where
    A: AuthorRepository + Send + Sync + 'static,
    B: BookRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    let use_case = ApplyAuthorUseCase::new(
        state.authors.clone(),
        state.users.clone(),
        state.cache.clone(),
    );
    let author = use_case.update_profile(&identity, req.into()).await?;

    Ok(Json(ApiResponse::ok(AuthorView::from(&author))))
}

// ============================================================================
// Book upload and management
// ============================================================================

/// Pull the upload submission out of a multipart body
async fn read_upload(mut multipart: Multipart) -> CatalogResult<UploadInput> {
    let bad_body =
        |e: axum::extract::multipart::MultipartError| CatalogError::Validation(format!("Malformed multipart body: {}", e));

    let mut title = String::new();
    let mut description = String::new();
    let mut category = String::new();
    let mut language = String::new();
    let mut price: Option<f64> = None;
    let mut rental_price: Option<f64> = None;
    let mut tags: Vec<String> = Vec::new();
    let mut file: Option<FilePart> = None;
    let mut cover: Option<FilePart> = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_body)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => title = field.text().await.map_err(bad_body)?,
            "description" => description = field.text().await.map_err(bad_body)?,
            "category" => category = field.text().await.map_err(bad_body)?,
            "language" => language = field.text().await.map_err(bad_body)?,
            "price" => {
                let text = field.text().await.map_err(bad_body)?;
                price = Some(text.parse().map_err(|_| {
                    CatalogError::Validation("Price must be a number".into())
                })?);
            }
            "rentalPrice" => {
                let text = field.text().await.map_err(bad_body)?;
                if !text.trim().is_empty() {
                    rental_price = Some(text.parse().map_err(|_| {
                        CatalogError::Validation("Rental price must be a number".into())
                    })?);
                }
            }
            "tags" => {
                let text = field.text().await.map_err(bad_body)?;
                tags = text
                    .split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(String::from)
                    .collect();
            }
            "file" | "cover" => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(bad_body)?.to_vec();
                let part = FilePart {
                    filename,
                    content_type,
                    bytes,
                };
                if name == "file" {
                    file = Some(part);
                } else {
                    cover = Some(part);
                }
            }
            _ => {}
        }
    }

    let file = file.ok_or(CatalogError::Validation(
        "A book file part is required".into(),
    ))?;
    let price = price.ok_or(CatalogError::Validation("Price is required".into()))?;

    Ok(UploadInput {
        title,
        description,
        category,
        language,
        price,
        rental_price,
        tags,
        file,
        cover,
    })
}

/// POST /api/books/upload
pub async fn upload_book<A, B, U>(
    State(state): State<CatalogAppState<A, B, U>>,
    Extension(identity): Extension<Identity>,
    multipart: Multipart,
) -> CatalogResult<(StatusCode, Json<ApiResponse<serde_json::Value>>)>
where
    A: AuthorRepository + Send + Sync + 'static,
    B: BookRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    if !identity.role.is_author_or_higher() {
        return Err(auth::AuthError::InsufficientRole.into());
    }

    let input = read_upload(multipart).await?;

    let use_case = UploadBookUseCase::new(
        state.authors.clone(),
        state.books.clone(),
        state.objects.clone(),
        state.cache.clone(),
        state.config.clone(),
    );
    let book = use_case.execute(&identity, input).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(serde_json::json!({
            "id": book.public_id.to_string(),
            "title": book.content.title,
            "isPublished": book.is_published,
        }))),
    ))
}

/// PUT /api/books/{id}
///
/// Shares its path with the public GET, so the mandatory gate cannot
/// wrap it; anonymous callers are rejected here instead.
pub async fn update_book<A, B, U>(
    State(state): State<CatalogAppState<A, B, U>>,
    identity: Option<Extension<Identity>>,
    Path(public_id): Path<String>,
    Json(req): Json<UpdateBookRequest>,
) -> CatalogResult<Json<ApiResponse<serde_json::Value>>>
where
    A: AuthorRepository + Send + Sync + 'static,
    B: BookRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    let Some(Extension(identity)) = identity else {
        return Err(auth::AuthError::AuthenticationRequired.into());
    };

    let use_case = ManageBookUseCase::new(
        state.authors.clone(),
        state.books.clone(),
        state.objects.clone(),
        state.cache.clone(),
    );
    let book = use_case
        .update(
            &identity,
            &public_id,
            UpdateBookInput {
                title: req.title,
                description: req.description,
                category: req.category,
                language: req.language,
                price: req.price,
                rental_price: req.rental_price,
                tags: req.tags,
            },
        )
        .await?;

    Ok(Json(ApiResponse::ok(serde_json::json!({
        "id": book.public_id.to_string(),
        "title": book.content.title,
    }))))
}

/// DELETE /api/books/{id}
pub async fn delete_book<A, B, U>(
    State(state): State<CatalogAppState<A, B, U>>,
    identity: Option<Extension<Identity>>,
    Path(public_id): Path<String>,
) -> CatalogResult<Json<ApiResponse<()>>>
where
    A: AuthorRepository + Send + Sync + 'static,
    B: BookRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    let Some(Extension(identity)) = identity else {
        return Err(auth::AuthError::AuthenticationRequired.into());
    };

    let use_case = ManageBookUseCase::new(
        state.authors.clone(),
        state.books.clone(),
        state.objects.clone(),
        state.cache.clone(),
    );
    use_case.delete(&identity, &public_id).await?;

    Ok(Json(ApiResponse::empty()))
}

// ============================================================================
// Admin moderation
// ============================================================================

/// GET /api/admin/authors
///
/// Moderation queue view; defaults to every status, filterable with
/// `status=pending` etc.
pub async fn admin_list_authors<A, B, U>(
    State(state): State<CatalogAppState<A, B, U>>,
    Query(query): Query<AuthorListQuery>,
) -> CatalogResult<Json<ApiResponse<Page<AuthorView>>>>
where
    A: AuthorRepository + Send + Sync + 'static,
    B: BookRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    let page = state
        .browse()
        .list_authors(&query.into_filter(true))
        .await?;

    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/admin/books/pending
///
/// Unpublished drafts awaiting a publish decision.
pub async fn admin_pending_books<A, B, U>(
    State(state): State<CatalogAppState<A, B, U>>,
    Query(query): Query<BookListQuery>,
) -> CatalogResult<Json<ApiResponse<Page<BookView>>>>
where
    A: AuthorRepository + Send + Sync + 'static,
    B: BookRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    let mut filter = query.into_filter(true);
    filter.published = Some(false);
    filter.active_only = true;

    let page = state.browse().list_books(&filter).await?;

    Ok(Json(ApiResponse::ok(page)))
}

/// POST /api/admin/authors/approve
pub async fn approve_author<A, B, U>(
    State(state): State<CatalogAppState<A, B, U>>,
    Json(req): Json<ApproveAuthorRequest>,
) -> CatalogResult<Json<ApiResponse<AuthorView>>>
where
    A: AuthorRepository + Send + Sync + 'static,
    B: BookRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    let use_case = ModerateAuthorsUseCase::new(
        state.authors.clone(),
        state.cache.clone(),
        state.notifier.clone(),
    );
    let author = use_case.approve(&req.author_id).await?;

    Ok(Json(ApiResponse::ok(AuthorView::from(&author))))
}

/// POST /api/admin/authors/reject
pub async fn reject_author<A, B, U>(
    State(state): State<CatalogAppState<A, B, U>>,
    Json(req): Json<RejectAuthorRequest>,
) -> CatalogResult<Json<ApiResponse<AuthorView>>>
where
    A: AuthorRepository + Send + Sync + 'static,
    B: BookRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    let use_case = ModerateAuthorsUseCase::new(
        state.authors.clone(),
        state.cache.clone(),
        state.notifier.clone(),
    );
    let author = use_case.reject(&req.author_id, &req.reason).await?;

    Ok(Json(ApiResponse::ok(AuthorView::from(&author))))
}

/// POST /api/admin/authors/toggle-status
pub async fn toggle_author_status<A, B, U>(
    State(state): State<CatalogAppState<A, B, U>>,
    Json(req): Json<ToggleAuthorRequest>,
) -> CatalogResult<Json<ApiResponse<serde_json::Value>>>
where
    A: AuthorRepository + Send + Sync + 'static,
    B: BookRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    let use_case = ModerateAuthorsUseCase::new(
        state.authors.clone(),
        state.cache.clone(),
        state.notifier.clone(),
    );
    let (author, cascaded) = use_case.toggle_active(&req.author_id, req.is_active).await?;

    Ok(Json(ApiResponse::ok(serde_json::json!({
        "author": AuthorView::from(&author),
        "booksAffected": cascaded,
    }))))
}

/// POST /api/admin/books/approve
pub async fn approve_book<A, B, U>(
    State(state): State<CatalogAppState<A, B, U>>,
    Json(req): Json<ApproveBookRequest>,
) -> CatalogResult<Json<ApiResponse<serde_json::Value>>>
where
    A: AuthorRepository + Send + Sync + 'static,
    B: BookRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    let use_case = ModerateBooksUseCase::new(state.books.clone(), state.cache.clone());
    let book = use_case.approve(&req.book_id).await?;

    Ok(Json(ApiResponse::ok(serde_json::json!({
        "id": book.public_id.to_string(),
        "isPublished": book.is_published,
        "publishedAt": book.published_at,
    }))))
}

/// POST /api/admin/books/reject
pub async fn reject_book<A, B, U>(
    State(state): State<CatalogAppState<A, B, U>>,
    Json(req): Json<RejectBookRequest>,
) -> CatalogResult<Json<ApiResponse<serde_json::Value>>>
where
    A: AuthorRepository + Send + Sync + 'static,
    B: BookRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    let use_case = ModerateBooksUseCase::new(state.books.clone(), state.cache.clone());
    let book = use_case.reject(&req.book_id, &req.reason).await?;

    Ok(Json(ApiResponse::ok(serde_json::json!({
        "id": book.public_id.to_string(),
        "isActive": book.is_active,
    }))))
}

/// POST /api/admin/books/toggle-status
pub async fn toggle_book_status<A, B, U>(
    State(state): State<CatalogAppState<A, B, U>>,
    Json(req): Json<ToggleBookRequest>,
) -> CatalogResult<Json<ApiResponse<serde_json::Value>>>
where
    A: AuthorRepository + Send + Sync + 'static,
    B: BookRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    let use_case = ModerateBooksUseCase::new(state.books.clone(), state.cache.clone());
    let book = use_case.toggle_active(&req.book_id, req.is_active).await?;

    Ok(Json(ApiResponse::ok(serde_json::json!({
        "id": book.public_id.to_string(),
        "isActive": book.is_active,
    }))))
}

/// POST /api/admin/books/toggle-featured
pub async fn toggle_book_featured<A, B, U>(
    State(state): State<CatalogAppState<A, B, U>>,
    Json(req): Json<FeatureBookRequest>,
) -> CatalogResult<Json<ApiResponse<serde_json::Value>>>
where
    A: AuthorRepository + Send + Sync + 'static,
    B: BookRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    let use_case = ModerateBooksUseCase::new(state.books.clone(), state.cache.clone());
    let book = use_case.toggle_featured(&req.book_id, req.featured).await?;

    Ok(Json(ApiResponse::ok(serde_json::json!({
        "id": book.public_id.to_string(),
        "isFeatured": book.is_featured,
        "featuredOrder": book.featured_order,
    }))))
}

/// POST /api/admin/books/set-featured-order
pub async fn set_book_featured_order<A, B, U>(
    State(state): State<CatalogAppState<A, B, U>>,
    Json(req): Json<FeaturedOrderRequest>,
) -> CatalogResult<Json<ApiResponse<serde_json::Value>>>
where
    A: AuthorRepository + Send + Sync + 'static,
    B: BookRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    let use_case = ModerateBooksUseCase::new(state.books.clone(), state.cache.clone());
    let book = use_case.set_featured_order(&req.book_id, req.order).await?;

    Ok(Json(ApiResponse::ok(serde_json::json!({
        "id": book.public_id.to_string(),
        "isFeatured": book.is_featured,
        "featuredOrder": book.featured_order,
    }))))
}
