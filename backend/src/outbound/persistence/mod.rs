//! Diesel-backed persistence adapters for PostgreSQL.

mod diesel_appointment_repository;
mod diesel_category_repository;
mod diesel_event_repository;
mod diesel_helpers;
mod diesel_message_repository;
mod diesel_notification_repository;
mod diesel_progress_repository;
mod diesel_reading_list_repository;
mod diesel_resource_repository;
mod diesel_review_repository;
mod diesel_stats_repository;
mod diesel_therapist_repository;
mod diesel_user_repository;
mod models;
pub mod pool;
pub mod schema;

pub use diesel_appointment_repository::DieselAppointmentRepository;
pub use diesel_category_repository::DieselCategoryRepository;
pub use diesel_event_repository::DieselEventRepository;
pub use diesel_message_repository::DieselMessageRepository;
pub use diesel_notification_repository::DieselNotificationRepository;
pub use diesel_progress_repository::DieselProgressRepository;
pub use diesel_reading_list_repository::DieselReadingListRepository;
pub use diesel_resource_repository::DieselResourceRepository;
pub use diesel_review_repository::DieselReviewRepository;
pub use diesel_stats_repository::DieselStatsRepository;
pub use diesel_therapist_repository::DieselTherapistRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
