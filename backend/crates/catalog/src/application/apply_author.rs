//! Author Application
//!
//! A reader submits an author profile, creating a pending application
//! for the moderation engine and promoting the user's role to Author.
//! Tokens issued before the promotion keep their old role claim until
//! the next login or refresh.

use std::sync::Arc;

use auth::domain::repository::UserRepository;
use auth::models::email::Email;
use kernel::identity::{Identity, Role};
use platform::cache::CacheStore;

use crate::application::cache_keys;
use crate::domain::entity::author::{Author, AuthorProfile};
use crate::domain::repository::AuthorRepository;
use crate::error::{CatalogError, CatalogResult};

/// Author profile fields as submitted
#[derive(Debug, Clone, Default)]
pub struct AuthorProfileInput {
    pub pen_name: String,
    pub bio: String,
    pub contact_email: String,
    pub location: Option<String>,
    pub background: Option<String>,
    pub genres: Vec<String>,
    pub languages: Vec<String>,
    pub payment_method: Option<String>,
    pub payment_details: Option<String>,
    pub social_links: Vec<String>,
}

impl AuthorProfileInput {
    /// Validate and normalize into the domain profile
    fn into_profile(self) -> CatalogResult<AuthorProfile> {
        let pen_name = self.pen_name.trim().to_string();
        if pen_name.is_empty() {
            return Err(CatalogError::Validation("Pen name is required".into()));
        }

        let bio = self.bio.trim().to_string();
        if bio.is_empty() {
            return Err(CatalogError::Validation("Bio is required".into()));
        }

        let contact_email = Email::new(self.contact_email)
            .map_err(|e| CatalogError::Validation(e.message().to_string()))?;

        Ok(AuthorProfile {
            pen_name,
            bio,
            contact_email: contact_email.as_str().to_string(),
            location: self.location,
            background: self.background,
            genres: self.genres,
            languages: self.languages,
            payment_method: self.payment_method,
            payment_details: self.payment_details,
            social_links: self.social_links,
        })
    }
}

/// Author application use case
pub struct ApplyAuthorUseCase<A, U>
where
    A: AuthorRepository,
    U: UserRepository,
{
    authors: Arc<A>,
    users: Arc<U>,
    cache: Arc<dyn CacheStore>,
}

impl<A, U> ApplyAuthorUseCase<A, U>
where
    A: AuthorRepository,
    U: UserRepository,
{
    pub fn new(authors: Arc<A>, users: Arc<U>, cache: Arc<dyn CacheStore>) -> Self {
        Self {
            authors,
            users,
            cache,
        }
    }

    /// Submit a new application
    pub async fn execute(
        &self,
        identity: &Identity,
        input: AuthorProfileInput,
    ) -> CatalogResult<Author> {
        let profile = input.into_profile()?;

        if self
            .authors
            .find_by_user_id(&identity.user_id)
            .await?
            .is_some()
        {
            return Err(CatalogError::Conflict(
                "An author application already exists for this user".into(),
            ));
        }

        let author = Author::new(identity.user_id, profile);
        self.authors.create(&author).await?;

        // Promote the account so author routes open up right away.
        let mut user = self
            .users
            .find_by_id(&identity.user_id)
            .await
            .map_err(CatalogError::Auth)?
            .ok_or(CatalogError::NotFound("User"))?;
        if user.role == Role::Reader {
            user.set_role(Role::Author);
            self.users.update(&user).await.map_err(CatalogError::Auth)?;
        }

        self.cache
            .invalidate_namespace(cache_keys::AUTHORS_LIST)
            .await;

        tracing::info!(author = %author.public_id, "Author application submitted");
        Ok(author)
    }

    /// Update the caller's own profile fields (never the status)
    pub async fn update_profile(
        &self,
        identity: &Identity,
        input: AuthorProfileInput,
    ) -> CatalogResult<Author> {
        let profile = input.into_profile()?;

        let mut author = self
            .authors
            .find_by_user_id(&identity.user_id)
            .await?
            .ok_or(CatalogError::NotFound("Author"))?;

        author.update_profile(profile);
        self.authors.update(&author).await?;

        self.cache
            .invalidate_namespace(cache_keys::AUTHORS_LIST)
            .await;
        self.cache
            .delete(cache_keys::AUTHORS_DETAIL, author.public_id.as_str())
            .await;

        Ok(author)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::AuthorStatus;
    use crate::test_support::{InMemoryCatalog, InMemoryUsers, profile_input, reader_identity};
    use platform::cache::MemoryCacheStore;

    fn fixtures() -> (
        Arc<InMemoryCatalog>,
        Arc<InMemoryUsers>,
        ApplyAuthorUseCase<InMemoryCatalog, InMemoryUsers>,
    ) {
        let repo = Arc::new(InMemoryCatalog::default());
        let users = Arc::new(InMemoryUsers::default());
        let use_case = ApplyAuthorUseCase::new(
            repo.clone(),
            users.clone(),
            Arc::new(MemoryCacheStore::new()),
        );
        (repo, users, use_case)
    }

    #[tokio::test]
    async fn test_apply_creates_pending_application_and_promotes_role() {
        let (_, users, use_case) = fixtures();
        let identity = reader_identity(&users);

        let author = use_case
            .execute(&identity, profile_input("New Writer"))
            .await
            .unwrap();

        assert_eq!(author.status, AuthorStatus::Pending);
        assert!(author.is_active);
        assert_eq!(author.user_id, identity.user_id);

        let user = users.get(&identity.user_id).unwrap();
        assert_eq!(user.role, Role::Author);
    }

    #[tokio::test]
    async fn test_duplicate_application_conflicts() {
        let (_, users, use_case) = fixtures();
        let identity = reader_identity(&users);

        use_case
            .execute(&identity, profile_input("New Writer"))
            .await
            .unwrap();

        let second = use_case.execute(&identity, profile_input("New Writer")).await;
        assert!(matches!(second, Err(CatalogError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_apply_validates_profile() {
        let (_, users, use_case) = fixtures();
        let identity = reader_identity(&users);

        let mut input = profile_input("New Writer");
        input.pen_name = "  ".into();
        assert!(matches!(
            use_case.execute(&identity, input).await,
            Err(CatalogError::Validation(_))
        ));

        let mut input = profile_input("New Writer");
        input.contact_email = "not-an-email".into();
        assert!(matches!(
            use_case.execute(&identity, input).await,
            Err(CatalogError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_update_profile_never_touches_status() {
        let (repo, users, use_case) = fixtures();
        let identity = reader_identity(&users);

        let author = use_case
            .execute(&identity, profile_input("New Writer"))
            .await
            .unwrap();

        // Simulate an admin approval between the two profile edits.
        let mut approved = repo.get_author(&author.author_id).unwrap();
        approved.approve();
        repo.insert_author(approved);

        let mut input = profile_input("New Writer");
        input.bio = "An updated biography".into();
        let updated = use_case.update_profile(&identity, input).await.unwrap();

        assert_eq!(updated.status, AuthorStatus::Approved);
        assert_eq!(updated.profile.bio, "An updated biography");
    }
}
