//! Port for therapist profile and schedule storage.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::therapist::{
    NewScheduleSlot, NewTherapist, ScheduleSlot, Therapist, TherapistFilter, TherapistPatch,
};

use super::RepositoryError;

/// Storage and retrieval of therapist profiles, hydrated with their user and
/// schedule slots.
#[async_trait]
pub trait TherapistRepository: Send + Sync {
    /// List therapists matching the filter.
    async fn list(&self, filter: &TherapistFilter) -> Result<Vec<Therapist>, RepositoryError>;

    /// Fetch a therapist by id.
    async fn find(&self, id: Uuid) -> Result<Option<Therapist>, RepositoryError>;

    /// Fetch the therapist profile owned by a user, if any.
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Therapist>, RepositoryError>;

    /// Create a profile with its initial schedule. Fails with
    /// [`RepositoryError::Duplicate`] when the user already has one and
    /// [`RepositoryError::Missing`] when the user does not exist.
    async fn create(&self, therapist: NewTherapist) -> Result<Therapist, RepositoryError>;

    /// Apply a partial update; a provided schedule replaces the slot set.
    async fn update(&self, id: Uuid, patch: TherapistPatch) -> Result<Therapist, RepositoryError>;

    /// Delete a profile and its schedule.
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;

    /// Replace the whole slot set for a therapist.
    async fn replace_schedule(
        &self,
        id: Uuid,
        slots: Vec<NewScheduleSlot>,
    ) -> Result<Vec<ScheduleSlot>, RepositoryError>;

    /// Store a recomputed rating aggregate.
    async fn set_rating(&self, id: Uuid, rating: f64, count: i32) -> Result<(), RepositoryError>;

    /// Count therapist profiles.
    async fn count(&self) -> Result<i64, RepositoryError>;
}
