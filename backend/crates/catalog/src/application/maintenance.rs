//! Scheduled Store Maintenance
//!
//! Runs outside the request path on a timer: expired time-limited
//! access records (rentals) are dropped so readers lose access when
//! their rental window closes.

use std::sync::Arc;

use crate::domain::repository::BookRepository;
use crate::error::CatalogResult;

/// Maintenance use case
pub struct MaintenanceUseCase<B>
where
    B: BookRepository,
{
    books: Arc<B>,
}

impl<B> MaintenanceUseCase<B>
where
    B: BookRepository,
{
    pub fn new(books: Arc<B>) -> Self {
        Self { books }
    }

    pub async fn run(&self) -> CatalogResult<u64> {
        let purged = self.books.purge_expired_rentals().await?;

        if purged > 0 {
            tracing::info!(rentals_purged = purged, "Expired rentals removed");
        }

        Ok(purged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::InMemoryCatalog;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_run_purges_only_expired_rentals() {
        let repo = Arc::new(InMemoryCatalog::default());
        repo.add_rental(Utc::now() - Duration::hours(1));
        repo.add_rental(Utc::now() - Duration::days(3));
        repo.add_rental(Utc::now() + Duration::days(3));

        let use_case = MaintenanceUseCase::new(repo.clone());
        assert_eq!(use_case.run().await.unwrap(), 2);
        // Idempotent on a second run.
        assert_eq!(use_case.run().await.unwrap(), 0);
    }
}
