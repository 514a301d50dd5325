//! Catalog Router
//!
//! Three gate levels:
//! - browse routes behind the optional gate (anonymous traffic passes)
//! - author self-service and book management behind the mandatory gate
//! - `/admin/*` behind the mandatory gate plus the admin role gate

use axum::{
    Router,
    middleware::from_fn,
    routing::{get, post},
};

use auth::domain::repository::{SessionStore, UserRepository};
use auth::presentation::middleware::{AuthGateState, optional_auth, require_auth, require_role};
use kernel::identity::Role;

use crate::domain::repository::{AuthorRepository, BookRepository};
use crate::presentation::handlers::{self, CatalogAppState};

/// Create the catalog router
pub fn catalog_router<A, B, U, S>(
    state: CatalogAppState<A, B, U>,
    gate: AuthGateState<S>,
) -> Router
where
    A: AuthorRepository + Send + Sync + 'static,
    B: BookRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
{
    // PUT and DELETE on /books/{id} share the public GET's path, so
    // they live behind the optional gate and reject anonymous callers
    // in the handler.
    let browse_gate = gate.clone();
    let browse = Router::new()
        .route("/books", get(handlers::list_books::<A, B, U>))
        .route(
            "/books/{id}",
            get(handlers::get_book::<A, B, U>)
                .put(handlers::update_book::<A, B, U>)
                .delete(handlers::delete_book::<A, B, U>),
        )
        .route("/authors", get(handlers::list_authors::<A, B, U>))
        .route("/authors/{id}", get(handlers::get_author::<A, B, U>))
        .layer(from_fn(move |req, next| {
            optional_auth(browse_gate.clone(), req, next)
        }));

    let member_gate = gate.clone();
    let member = Router::new()
        .route("/authors/apply", post(handlers::apply_author::<A, B, U>))
        .route(
            "/authors/me",
            get(handlers::my_author_profile::<A, B, U>)
                .put(handlers::update_author_profile::<A, B, U>),
        )
        .route("/books/upload", post(handlers::upload_book::<A, B, U>))
        .layer(from_fn(move |req, next| {
            require_auth(member_gate.clone(), req, next)
        }));

    let admin = Router::new()
        .route("/admin/authors", get(handlers::admin_list_authors::<A, B, U>))
        .route(
            "/admin/books/pending",
            get(handlers::admin_pending_books::<A, B, U>),
        )
        .route("/admin/authors/approve", post(handlers::approve_author::<A, B, U>))
        .route("/admin/authors/reject", post(handlers::reject_author::<A, B, U>))
        .route(
            "/admin/authors/toggle-status",
            post(handlers::toggle_author_status::<A, B, U>),
        )
        .route("/admin/books/approve", post(handlers::approve_book::<A, B, U>))
        .route("/admin/books/reject", post(handlers::reject_book::<A, B, U>))
        .route(
            "/admin/books/toggle-status",
            post(handlers::toggle_book_status::<A, B, U>),
        )
        .route(
            "/admin/books/toggle-featured",
            post(handlers::toggle_book_featured::<A, B, U>),
        )
        .route(
            "/admin/books/set-featured-order",
            post(handlers::set_book_featured_order::<A, B, U>),
        )
        .layer(from_fn(|req, next| {
            require_role(&[Role::Admin], req, next)
        }))
        .layer(from_fn(move |req, next| {
            require_auth(gate.clone(), req, next)
        }));

    browse.merge(member).merge(admin).with_state(state)
}
