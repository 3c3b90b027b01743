//! Repository ports implemented by the persistence adapters.
//!
//! Every port returns [`RepositoryError`]; the `From` impl onto the domain
//! [`Error`](crate::domain::Error) lets handlers propagate failures with `?`
//! while keeping HTTP mapping in one place.

mod macros;

pub mod appointments;
pub mod categories;
pub mod events;
pub mod messages;
pub mod notifications;
pub mod progress;
pub mod reading_lists;
pub mod resources;
pub mod reviews;
pub mod stats;
pub mod therapists;
pub mod users;

pub(crate) use macros::define_port_error;

pub use appointments::AppointmentRepository;
pub use categories::CategoryRepository;
pub use events::EventRepository;
pub use messages::MessageRepository;
pub use notifications::NotificationRepository;
pub use progress::ProgressRepository;
pub use reading_lists::ReadingListRepository;
pub use resources::ResourceRepository;
pub use reviews::ReviewRepository;
pub use stats::StatsRepository;
pub use therapists::TherapistRepository;
pub use users::UserRepository;

use crate::domain::Error;

define_port_error! {
    /// Errors raised by repository adapters.
    pub enum RepositoryError {
        /// The backing store could not be reached.
        Connection { message: String } =>
            "repository connection failed: {message}",
        /// A query or mutation failed during execution.
        Query { message: String } =>
            "repository query failed: {message}",
        /// The mutation violates a uniqueness or capacity constraint.
        Duplicate { entity: String } =>
            "duplicate {entity}",
        /// The referenced record does not exist.
        Missing { entity: String } =>
            "{entity} not found",
    }
}

impl From<RepositoryError> for Error {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Connection { message } => {
                tracing::error!(%message, "repository connection failure");
                Error::service_unavailable("storage unavailable")
            }
            RepositoryError::Query { message } => {
                tracing::error!(%message, "repository query failure");
                Error::internal("storage error")
            }
            RepositoryError::Duplicate { entity } => Error::conflict(format!("duplicate {entity}")),
            RepositoryError::Missing { entity } => Error::not_found(format!("{entity} not found")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;

    #[test]
    fn duplicate_maps_to_conflict() {
        let err = Error::from(RepositoryError::duplicate("review"));
        assert_eq!(err.code(), ErrorCode::Conflict);
        assert_eq!(err.message(), "duplicate review");
    }

    #[test]
    fn missing_maps_to_not_found() {
        let err = Error::from(RepositoryError::missing("therapist"));
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[test]
    fn internal_failures_are_redacted() {
        let err = Error::from(RepositoryError::query("relation does not exist"));
        assert_eq!(err.code(), ErrorCode::InternalError);
        assert_eq!(err.message(), "storage error");
    }
}
