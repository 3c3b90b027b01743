//! Port for appointment and payment storage.

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::appointment::{
    Appointment, AppointmentFilter, AppointmentPatch, AppointmentStatus, NewAppointment,
    NewPayment,
};
use crate::domain::user::Viewer;

use super::RepositoryError;

/// Storage and retrieval of appointments.
///
/// List queries are scoped by the caller: admins see every appointment,
/// therapists see their own calendar, clients see their own bookings.
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// List appointments visible to the viewer, filtered.
    async fn list(
        &self,
        viewer: &Viewer,
        filter: &AppointmentFilter,
    ) -> Result<Vec<Appointment>, RepositoryError>;

    /// List every appointment on a therapist's calendar.
    async fn list_for_therapist(
        &self,
        therapist_id: Uuid,
    ) -> Result<Vec<Appointment>, RepositoryError>;

    /// Fetch an appointment by id.
    async fn find(&self, id: Uuid) -> Result<Option<Appointment>, RepositoryError>;

    /// Book an appointment, optionally with an attached payment.
    async fn create(
        &self,
        appointment: NewAppointment,
        payment: Option<NewPayment>,
    ) -> Result<Appointment, RepositoryError>;

    /// Apply a partial update.
    async fn update(
        &self,
        id: Uuid,
        patch: AppointmentPatch,
    ) -> Result<Appointment, RepositoryError>;

    /// Update only the lifecycle status.
    async fn update_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> Result<Appointment, RepositoryError>;

    /// Delete an appointment and its payment.
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;

    /// Whether the therapist owned by `therapist_user_id` shares at least one
    /// appointment with `user_id`. Gates the `user_id` list filter for
    /// therapists.
    async fn shares_client(
        &self,
        therapist_user_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, RepositoryError>;

    /// Distinct ids of users who have appointments with the therapist owned
    /// by `therapist_user_id`. Drives progress visibility for therapists.
    async fn client_ids(&self, therapist_user_id: Uuid) -> Result<Vec<Uuid>, RepositoryError>;

    /// Count appointments on a date.
    async fn count_on(&self, date: NaiveDate) -> Result<i64, RepositoryError>;

    /// Appointment counts per status, for the dashboard.
    async fn count_by_status(&self) -> Result<Vec<(AppointmentStatus, i64)>, RepositoryError>;
}
