//! Port for user account storage.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::user::{NewUser, User, UserFilter, UserPatch, UserRole};

use super::RepositoryError;

/// Storage and retrieval of user accounts.
///
/// The password hash is write-only through this port except for
/// [`UserRepository::credentials_by_email`], which the login flow uses for
/// verification.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// List users matching the filter, newest first.
    async fn list(&self, filter: &UserFilter) -> Result<Vec<User>, RepositoryError>;

    /// Fetch a user by id.
    async fn find(&self, id: Uuid) -> Result<Option<User>, RepositoryError>;

    /// Fetch a user together with their password hash for login verification.
    async fn credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<(User, String)>, RepositoryError>;

    /// Create a user. Fails with [`RepositoryError::Duplicate`] when the
    /// email is already registered.
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError>;

    /// Apply a partial update.
    async fn update(&self, id: Uuid, patch: UserPatch) -> Result<User, RepositoryError>;

    /// Delete a user and everything cascading from it.
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;

    /// Count users holding the given role.
    async fn count_by_role(&self, role: UserRole) -> Result<i64, RepositoryError>;
}
