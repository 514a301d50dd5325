//! Request DTOs
//!
//! Responses reuse the cached view types from the application layer
//! ([`crate::application::browse::BookView`] and friends) so the HTTP
//! shape and the cached shape cannot drift apart.

use serde::Deserialize;

use crate::application::AuthorProfileInput;
use crate::domain::repository::{AuthorListFilter, BookListFilter, DEFAULT_PAGE_SIZE};
use crate::domain::value_object::AuthorStatus;

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    DEFAULT_PAGE_SIZE
}

/// Query string for book listings
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookListQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    pub search: Option<String>,
    pub category: Option<String>,
    /// Author public id; resolved to the internal id by the handler
    pub author_id: Option<String>,
    pub featured: Option<bool>,
    /// Admin-only: include unpublished and deactivated books
    #[serde(default)]
    pub include_hidden: bool,
}

impl BookListQuery {
    /// Build the repository filter; `admin` unlocks the hidden rows
    ///
    /// The author filter is left unresolved here (public id to
    /// internal id needs a store lookup).
    pub fn into_filter(self, admin: bool) -> BookListFilter {
        let mut filter = BookListFilter::new(self.page, self.limit);
        filter.search = self.search.filter(|s| !s.trim().is_empty());
        filter.category = self.category.filter(|c| !c.trim().is_empty());
        filter.featured = self.featured;
        if admin && self.include_hidden {
            filter.published = None;
            filter.active_only = false;
        }
        filter
    }
}

/// Query string for author listings
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorListQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    pub search: Option<String>,
    /// Status code filter (admin listings)
    pub status: Option<String>,
    #[serde(default)]
    pub include_hidden: bool,
}

impl AuthorListQuery {
    pub fn into_filter(self, admin: bool) -> AuthorListFilter {
        let mut filter = AuthorListFilter::new(self.page, self.limit);
        filter.search = self.search.filter(|s| !s.trim().is_empty());
        if admin {
            filter.status = self.status.as_deref().and_then(AuthorStatus::from_code);
            if self.include_hidden {
                filter.active_only = false;
            }
        } else {
            // The public directory only shows approved sellers.
            filter.status = Some(AuthorStatus::Approved);
        }
        filter
    }
}

/// POST /api/authors/apply and PUT /api/authors/me
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorApplicationRequest {
    pub pen_name: String,
    pub bio: String,
    pub contact_email: String,
    pub location: Option<String>,
    pub background: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    pub payment_method: Option<String>,
    pub payment_details: Option<String>,
    #[serde(default)]
    pub social_links: Vec<String>,
}

impl From<AuthorApplicationRequest> for AuthorProfileInput {
    fn from(req: AuthorApplicationRequest) -> Self {
        Self {
            pen_name: req.pen_name,
            bio: req.bio,
            contact_email: req.contact_email,
            location: req.location,
            background: req.background,
            genres: req.genres,
            languages: req.languages,
            payment_method: req.payment_method,
            payment_details: req.payment_details,
            social_links: req.social_links,
        }
    }
}

/// PUT /api/books/{id}
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub language: String,
    pub price: f64,
    pub rental_price: Option<f64>,
    #[serde(default)]
    pub tags: Vec<String>,
}

// Admin moderation bodies. Targets are public ids.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveAuthorRequest {
    pub author_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectAuthorRequest {
    pub author_id: String,
    pub reason: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleAuthorRequest {
    pub author_id: String,
    pub is_active: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveBookRequest {
    pub book_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectBookRequest {
    pub book_id: String,
    pub reason: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleBookRequest {
    pub book_id: String,
    pub is_active: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureBookRequest {
    pub book_id: String,
    pub featured: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturedOrderRequest {
    pub book_id: String,
    pub order: i32,
}
