//! Catalog Backend Module
//!
//! The marketplace catalog: author applications and moderation, book
//! publication and featuring, cache-aside browsing, and the multipart
//! upload pipeline with rollback.
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits
//! - `application/` - Use cases and application services
//! - `infra/` - PostgreSQL implementations
//! - `presentation/` - HTTP handlers, DTOs, router

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

pub use application::config::CatalogConfig;
pub use error::{CatalogError, CatalogResult};
pub use infra::postgres::PgCatalogRepository;
pub use presentation::handlers::CatalogAppState;
pub use presentation::router::catalog_router;

#[cfg(test)]
pub(crate) mod test_support;
