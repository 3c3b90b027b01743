//! Port for event and registration storage.

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::appointment::PaymentStatus;
use crate::domain::event::{Event, EventFilter, EventPatch, EventRegistration, NewEvent};

use super::RepositoryError;

/// Storage and retrieval of events, hydrated with their registrations.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// List events matching the filter, soonest first.
    async fn list(&self, filter: &EventFilter) -> Result<Vec<Event>, RepositoryError>;

    /// Fetch an event by id.
    async fn find(&self, id: Uuid) -> Result<Option<Event>, RepositoryError>;

    /// Create an event.
    async fn create(&self, event: NewEvent) -> Result<Event, RepositoryError>;

    /// Apply a partial update.
    async fn update(&self, id: Uuid, patch: EventPatch) -> Result<Event, RepositoryError>;

    /// Delete an event and its registrations.
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;

    /// Number of registrations currently held for an event.
    async fn registration_count(&self, event_id: Uuid) -> Result<i64, RepositoryError>;

    /// Fetch a user's registration for an event, if any.
    async fn find_registration(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<EventRegistration>, RepositoryError>;

    /// Add a registration. Fails with [`RepositoryError::Duplicate`] when the
    /// user is already registered.
    async fn add_registration(
        &self,
        event_id: Uuid,
        user_id: Uuid,
        payment_status: PaymentStatus,
    ) -> Result<EventRegistration, RepositoryError>;

    /// Remove a user's registration. Fails with [`RepositoryError::Missing`]
    /// when none exists.
    async fn remove_registration(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), RepositoryError>;

    /// Count events on or after the given date.
    async fn count_upcoming(&self, from: NaiveDate) -> Result<i64, RepositoryError>;
}
