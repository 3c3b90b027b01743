//! Port for educational resource storage.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::resource::{NewResource, Resource, ResourceFilter, ResourcePatch};

use super::RepositoryError;

/// Storage and retrieval of educational resources.
#[async_trait]
pub trait ResourceRepository: Send + Sync {
    /// List resources matching the filter, newest first.
    async fn list(&self, filter: &ResourceFilter) -> Result<Vec<Resource>, RepositoryError>;

    /// Fetch a resource by id.
    async fn find(&self, id: Uuid) -> Result<Option<Resource>, RepositoryError>;

    /// Create a resource.
    async fn create(&self, resource: NewResource) -> Result<Resource, RepositoryError>;

    /// Apply a partial update.
    async fn update(&self, id: Uuid, patch: ResourcePatch) -> Result<Resource, RepositoryError>;

    /// Delete a resource.
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;

    /// Count all resources.
    async fn count(&self) -> Result<i64, RepositoryError>;
}
