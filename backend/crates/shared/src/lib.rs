//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the "smallest core" of vocabulary shared by the
//! marketplace domains:
//! - Common error types and result aliases
//! - The `{ success, data, error, code }` response envelope
//! - Common primitive value objects (typed ID wrappers)
//! - The request identity vocabulary (roles, authenticated identity)
//!
//! **Design Principle**: Only include things that are "hard to change"
//! and have consistent meaning across all domains.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
pub mod identity;
pub mod response;
