//! Catalog Configuration

use std::time::Duration;

/// Catalog application configuration
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// TTL for cached listing pages
    pub list_ttl: Duration,
    /// TTL for cached detail pages
    pub detail_ttl: Duration,
    /// Maximum book file size in bytes
    pub max_book_file_bytes: usize,
    /// Maximum cover image size in bytes
    pub max_cover_bytes: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            list_ttl: Duration::from_secs(5 * 60),
            detail_ttl: Duration::from_secs(10 * 60),
            max_book_file_bytes: 50 * 1024 * 1024,
            max_cover_bytes: 5 * 1024 * 1024,
        }
    }
}
