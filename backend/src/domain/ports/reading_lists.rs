//! Port for reading list storage.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::reading_list::{
    NewReadingList, ReadingList, ReadingListFilter, ReadingListPatch,
};

use super::RepositoryError;

/// Storage and retrieval of reading lists, hydrated with their items.
#[async_trait]
pub trait ReadingListRepository: Send + Sync {
    /// List reading lists matching the filter.
    async fn list(&self, filter: &ReadingListFilter) -> Result<Vec<ReadingList>, RepositoryError>;

    /// Fetch a reading list by id.
    async fn find(&self, id: Uuid) -> Result<Option<ReadingList>, RepositoryError>;

    /// Create a reading list with its ordered items.
    async fn create(&self, list: NewReadingList) -> Result<ReadingList, RepositoryError>;

    /// Apply a partial update; a provided book list replaces all items.
    async fn update(
        &self,
        id: Uuid,
        patch: ReadingListPatch,
    ) -> Result<ReadingList, RepositoryError>;

    /// Delete a reading list and its items.
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;
}
