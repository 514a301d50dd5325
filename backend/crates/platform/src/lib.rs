//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Password hashing (Argon2id, NIST SP 800-63B compliant)
//! - Bearer token header extraction
//! - Cache store abstraction (Redis / in-memory) with
//!   generation-stamped namespace invalidation
//! - Object store abstraction (filesystem / in-memory)
//! - Best-effort e-mail notification dispatch

pub mod bearer;
pub mod cache;
pub mod notify;
pub mod object;
pub mod password;
