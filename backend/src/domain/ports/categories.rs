//! Port for category storage.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::category::{Category, CategoryPatch, NewCategory};

use super::RepositoryError;

/// Storage and retrieval of display categories.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// List all categories.
    async fn list(&self) -> Result<Vec<Category>, RepositoryError>;

    /// Fetch a category by id.
    async fn find(&self, id: Uuid) -> Result<Option<Category>, RepositoryError>;

    /// Create a category.
    async fn create(&self, category: NewCategory) -> Result<Category, RepositoryError>;

    /// Apply a partial update.
    async fn update(&self, id: Uuid, patch: CategoryPatch) -> Result<Category, RepositoryError>;

    /// Delete a category.
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;
}
