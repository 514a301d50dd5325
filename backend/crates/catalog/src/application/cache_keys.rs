//! Cache Namespaces
//!
//! Namespace constants for the cache store. Listing namespaces are
//! invalidated wholesale on any mutation that can affect list pages;
//! detail entries are point-deleted by public id.

pub const BOOKS_LIST: &str = "books:list";
pub const BOOKS_DETAIL: &str = "books:detail";
pub const BOOKS_FEATURED: &str = "books:featured";
pub const AUTHORS_LIST: &str = "authors:list";
pub const AUTHORS_DETAIL: &str = "authors:detail";
