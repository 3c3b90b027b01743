//! Port for progress entry storage.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::progress::{NewProgressEntry, ProgressEntry, ProgressFilter, ProgressPatch};
use crate::domain::user::Viewer;

use super::RepositoryError;

/// Storage and retrieval of per-user daily progress logs.
///
/// Listing is role-scoped: clients see their own rows, therapists see rows
/// belonging to users they share an appointment with, admins see everything.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// List entries visible to the viewer, filtered, newest first.
    async fn list(
        &self,
        viewer: &Viewer,
        filter: &ProgressFilter,
    ) -> Result<Vec<ProgressEntry>, RepositoryError>;

    /// Fetch an entry by id.
    async fn find(&self, id: Uuid) -> Result<Option<ProgressEntry>, RepositoryError>;

    /// Create an entry.
    async fn create(&self, entry: NewProgressEntry) -> Result<ProgressEntry, RepositoryError>;

    /// Apply a partial update.
    async fn update(&self, id: Uuid, patch: ProgressPatch)
    -> Result<ProgressEntry, RepositoryError>;

    /// Delete an entry.
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;
}
