//! Author Application Moderation
//!
//! State machine: `Pending -> Approved` or `Pending -> Rejected`, each
//! taken at most once. The independent `is_active` toggle cascades to
//! the author's books on deactivation only.
//!
//! Decision notifications are best-effort: dispatched on a detached
//! task, logged on failure, never joined into the response path.

use std::sync::Arc;

use platform::cache::CacheStore;
use platform::notify::{self, EmailMessage, EmailNotifier};

use crate::application::cache_keys;
use crate::domain::entity::author::Author;
use crate::domain::repository::AuthorRepository;
use crate::error::{CatalogError, CatalogResult};

/// Author moderation use case
pub struct ModerateAuthorsUseCase<A>
where
    A: AuthorRepository,
{
    authors: Arc<A>,
    cache: Arc<dyn CacheStore>,
    notifier: Arc<dyn EmailNotifier>,
}

impl<A> ModerateAuthorsUseCase<A>
where
    A: AuthorRepository,
{
    pub fn new(
        authors: Arc<A>,
        cache: Arc<dyn CacheStore>,
        notifier: Arc<dyn EmailNotifier>,
    ) -> Self {
        Self {
            authors,
            cache,
            notifier,
        }
    }

    async fn find(&self, public_id: &str) -> CatalogResult<Author> {
        self.authors
            .find_by_public_id(public_id)
            .await?
            .ok_or(CatalogError::NotFound("Author"))
    }

    async fn invalidate(&self, public_id: &str) {
        self.cache
            .invalidate_namespace(cache_keys::AUTHORS_LIST)
            .await;
        self.cache
            .delete(cache_keys::AUTHORS_DETAIL, public_id)
            .await;
    }

    /// Approve a pending application
    ///
    /// Conflicts when the application is no longer pending, so a
    /// double-approve can never send two approval notifications.
    pub async fn approve(&self, public_id: &str) -> CatalogResult<Author> {
        let mut author = self.find(public_id).await?;

        if !author.status.is_pending() {
            return Err(CatalogError::Conflict(format!(
                "Author application is already {}",
                author.status
            )));
        }

        author.approve();
        self.authors.update(&author).await?;
        self.invalidate(public_id).await;

        let _ = notify::dispatch(
            self.notifier.clone(),
            EmailMessage {
                to: author.profile.contact_email.clone(),
                subject: "Your author application was approved".into(),
                body: format!(
                    "Congratulations {}, your author application has been approved. \
                     You can now upload books.",
                    author.profile.pen_name
                ),
            },
        );

        tracing::info!(author = %author.public_id, "Author application approved");
        Ok(author)
    }

    /// Reject a pending application with a reason
    pub async fn reject(&self, public_id: &str, reason: &str) -> CatalogResult<Author> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(CatalogError::Validation(
                "A rejection reason is required".into(),
            ));
        }

        let mut author = self.find(public_id).await?;

        if !author.status.is_pending() {
            return Err(CatalogError::Conflict(format!(
                "Author application is already {}",
                author.status
            )));
        }

        author.reject(reason.to_string());
        self.authors.update(&author).await?;
        self.invalidate(public_id).await;

        // The reason goes to the author verbatim.
        let _ = notify::dispatch(
            self.notifier.clone(),
            EmailMessage {
                to: author.profile.contact_email.clone(),
                subject: "Your author application was rejected".into(),
                body: format!(
                    "Dear {}, your author application was rejected. Reason: {}",
                    author.profile.pen_name, reason
                ),
            },
        );

        tracing::info!(author = %author.public_id, "Author application rejected");
        Ok(author)
    }

    /// Enable or disable an author
    ///
    /// Disabling cascades `is_active = false` to every owned book in
    /// the same transaction. Re-enabling does NOT re-enable books; an
    /// admin re-enables them individually so content hidden for cause
    /// stays hidden.
    pub async fn toggle_active(&self, public_id: &str, active: bool) -> CatalogResult<(Author, u64)> {
        let author = self.find(public_id).await?;

        let cascaded = self
            .authors
            .set_active_cascade(&author.author_id, active)
            .await?;

        self.invalidate(public_id).await;
        // The cascade can change which books are visible anywhere.
        self.cache.invalidate_namespace(cache_keys::BOOKS_LIST).await;
        self.cache
            .invalidate_namespace(cache_keys::BOOKS_FEATURED)
            .await;
        self.cache
            .invalidate_namespace(cache_keys::BOOKS_DETAIL)
            .await;

        let author = self.find(public_id).await?;

        tracing::info!(
            author = %author.public_id,
            active,
            books_cascaded = cascaded,
            "Author active state changed"
        );

        Ok((author, cascaded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::AuthorStatus;
    use crate::test_support::{
        InMemoryCatalog, RecordingNotifier, approved_author, draft_book, pending_author,
        published_book,
    };
    use platform::cache::MemoryCacheStore;
    use serde_json::json;
    use std::time::Duration;

    fn fixtures() -> (
        Arc<InMemoryCatalog>,
        Arc<MemoryCacheStore>,
        Arc<RecordingNotifier>,
        ModerateAuthorsUseCase<InMemoryCatalog>,
    ) {
        let repo = Arc::new(InMemoryCatalog::default());
        let cache = Arc::new(MemoryCacheStore::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let use_case = ModerateAuthorsUseCase::new(repo.clone(), cache.clone(), notifier.clone());
        (repo, cache, notifier, use_case)
    }

    async fn settle() {
        // Give detached notification tasks a chance to run.
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    #[tokio::test]
    async fn test_approve_then_second_approve_conflicts_with_one_notification() {
        let (repo, _, notifier, use_case) = fixtures();
        let author = pending_author(&repo);
        let public_id = author.public_id.to_string();

        let approved = use_case.approve(&public_id).await.unwrap();
        assert_eq!(approved.status, AuthorStatus::Approved);
        assert!(approved.approved_at.is_some());

        let second = use_case.approve(&public_id).await;
        assert!(matches!(second, Err(CatalogError::Conflict(_))));

        settle().await;
        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_reject_requires_reason_and_sends_it_verbatim() {
        let (repo, _, notifier, use_case) = fixtures();
        let author = pending_author(&repo);
        let public_id = author.public_id.to_string();

        assert!(matches!(
            use_case.reject(&public_id, "   ").await,
            Err(CatalogError::Validation(_))
        ));

        let rejected = use_case
            .reject(&public_id, "Profile is incomplete")
            .await
            .unwrap();
        assert_eq!(rejected.status, AuthorStatus::Rejected);
        assert_eq!(
            rejected.rejection_reason.as_deref(),
            Some("Profile is incomplete")
        );

        settle().await;
        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].body.contains("Profile is incomplete"));
    }

    #[tokio::test]
    async fn test_reject_after_approve_conflicts() {
        let (repo, _, _, use_case) = fixtures();
        let author = pending_author(&repo);
        let public_id = author.public_id.to_string();

        use_case.approve(&public_id).await.unwrap();
        assert!(matches!(
            use_case.reject(&public_id, "too late").await,
            Err(CatalogError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_disable_cascades_and_reenable_does_not() {
        let (repo, _, _, use_case) = fixtures();
        let author = approved_author(&repo);
        let public_id = author.public_id.to_string();

        for title in ["B1", "B2", "B3"] {
            published_book(&repo, &author, title, "Fiction");
        }

        let (author_row, cascaded) = use_case.toggle_active(&public_id, false).await.unwrap();
        assert!(!author_row.is_active);
        assert_eq!(cascaded, 3);
        assert!(repo.books_of(&author.author_id).iter().all(|b| !b.is_active));

        // Asymmetric: re-enabling the author leaves books disabled.
        let (author_row, cascaded) = use_case.toggle_active(&public_id, true).await.unwrap();
        assert!(author_row.is_active);
        assert_eq!(cascaded, 0);
        assert!(repo.books_of(&author.author_id).iter().all(|b| !b.is_active));
    }

    #[tokio::test]
    async fn test_notification_failure_does_not_fail_approval() {
        let (repo, _, notifier, use_case) = fixtures();
        notifier.set_fail(true);
        let author = pending_author(&repo);

        let approved = use_case.approve(&author.public_id.to_string()).await.unwrap();
        assert_eq!(approved.status, AuthorStatus::Approved);

        settle().await;
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_moderation_invalidates_cached_listings() {
        let (repo, cache, _, use_case) = fixtures();
        let author = pending_author(&repo);

        cache
            .put(cache_keys::AUTHORS_LIST, "p1", &json!({"stale": true}), Duration::from_secs(60))
            .await;

        use_case.approve(&author.public_id.to_string()).await.unwrap();
        assert!(cache.get(cache_keys::AUTHORS_LIST, "p1").await.is_none());
    }

    #[tokio::test]
    async fn test_disable_bumps_book_namespaces() {
        let (repo, cache, _, use_case) = fixtures();
        let author = approved_author(&repo);
        draft_book(&repo, &author, "B1", "Fiction");

        cache
            .put(cache_keys::BOOKS_LIST, "p1", &json!(1), Duration::from_secs(60))
            .await;
        cache
            .put(cache_keys::BOOKS_DETAIL, "b1", &json!(2), Duration::from_secs(60))
            .await;

        use_case
            .toggle_active(&author.public_id.to_string(), false)
            .await
            .unwrap();

        assert!(cache.get(cache_keys::BOOKS_LIST, "p1").await.is_none());
        assert!(cache.get(cache_keys::BOOKS_DETAIL, "b1").await.is_none());
    }
}
