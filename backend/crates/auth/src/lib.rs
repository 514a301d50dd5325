//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits
//! - `application/` - Use cases and application services
//! - `infra/` - PostgreSQL and Redis implementations
//! - `presentation/` - HTTP handlers, DTOs, middleware, router
//!
//! ## Features
//! - Registration/login with email + password, returning a bearer token
//! - Stateless signed tokens (HS256) backed by a revocable session store:
//!   logout deletes the session, which invalidates the token immediately
//!   even though its own signature/expiry would still verify
//! - Role gate middleware (Reader / Author / Admin)
//! - Bootstrap-admin promotion from a configured e-mail allow-list
//!
//! ## Security Model
//! - Passwords hashed with Argon2id (NIST SP 800-63B compliant)
//! - Token validity is necessary but not sufficient: the backing
//!   session record must exist

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;
pub mod token;

#[cfg(test)]
pub(crate) mod test_support;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use error::{AuthError, AuthResult};
pub use infra::memory::MemorySessionStore;
pub use infra::postgres::PgUserRepository;
pub use infra::redis::RedisSessionStore;
pub use presentation::router::auth_router;
pub use token::TokenCodec;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}
