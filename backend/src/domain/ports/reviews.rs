//! Port for review storage.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::review::{NewReview, Review, ReviewFilter, ReviewPatch};

use super::RepositoryError;

/// Storage and retrieval of therapist reviews.
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// List reviews matching the filter, newest first.
    async fn list(&self, filter: &ReviewFilter) -> Result<Vec<Review>, RepositoryError>;

    /// Fetch a review by id.
    async fn find(&self, id: Uuid) -> Result<Option<Review>, RepositoryError>;

    /// Whether the user has already reviewed the therapist.
    async fn exists(&self, user_id: Uuid, therapist_id: Uuid) -> Result<bool, RepositoryError>;

    /// Create a review. Fails with [`RepositoryError::Duplicate`] for a
    /// second review of the same therapist by the same user.
    async fn create(&self, review: NewReview) -> Result<Review, RepositoryError>;

    /// Apply a partial update.
    async fn update(&self, id: Uuid, patch: ReviewPatch) -> Result<Review, RepositoryError>;

    /// Delete a review.
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;

    /// Average rating and review count for a therapist; `(0.0, 0)` when the
    /// therapist has no reviews.
    async fn aggregate_for(&self, therapist_id: Uuid) -> Result<(f64, i32), RepositoryError>;
}
