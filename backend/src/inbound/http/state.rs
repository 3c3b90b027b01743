//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they depend only
//! on domain ports and services and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AppointmentRepository, CategoryRepository, EventRepository, MessageRepository,
    NotificationRepository, ProgressRepository, ReadingListRepository, ResourceRepository,
    ReviewRepository, StatsRepository, TherapistRepository, UserRepository,
};
use crate::domain::{DashboardService, EventService, ReviewService};

/// Parameter object bundling every port implementation for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub users: Arc<dyn UserRepository>,
    pub therapists: Arc<dyn TherapistRepository>,
    pub appointments: Arc<dyn AppointmentRepository>,
    pub reviews: Arc<dyn ReviewRepository>,
    pub resources: Arc<dyn ResourceRepository>,
    pub events: Arc<dyn EventRepository>,
    pub reading_lists: Arc<dyn ReadingListRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
    pub messages: Arc<dyn MessageRepository>,
    pub progress: Arc<dyn ProgressRepository>,
    pub stats: Arc<dyn StatsRepository>,
}

/// Dependency bundle for HTTP handlers: the ports plus the domain services
/// built over them.
#[derive(Clone)]
pub struct HttpState {
    pub users: Arc<dyn UserRepository>,
    pub therapists: Arc<dyn TherapistRepository>,
    pub appointments: Arc<dyn AppointmentRepository>,
    pub reviews: Arc<dyn ReviewRepository>,
    pub resources: Arc<dyn ResourceRepository>,
    pub events: Arc<dyn EventRepository>,
    pub reading_lists: Arc<dyn ReadingListRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
    pub messages: Arc<dyn MessageRepository>,
    pub progress: Arc<dyn ProgressRepository>,
    pub stats: Arc<dyn StatsRepository>,
    pub review_service: ReviewService,
    pub event_service: EventService,
    pub dashboard_service: DashboardService,
}

impl HttpState {
    /// Construct state from a ports bundle, wiring the domain services.
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            users,
            therapists,
            appointments,
            reviews,
            resources,
            events,
            reading_lists,
            categories,
            notifications,
            messages,
            progress,
            stats,
        } = ports;

        let review_service = ReviewService::new(reviews.clone(), therapists.clone());
        let event_service = EventService::new(events.clone());
        let dashboard_service = DashboardService::new(
            stats.clone(),
            users.clone(),
            therapists.clone(),
            appointments.clone(),
            resources.clone(),
            events.clone(),
        );

        Self {
            users,
            therapists,
            appointments,
            reviews,
            resources,
            events,
            reading_lists,
            categories,
            notifications,
            messages,
            progress,
            stats,
            review_service,
            event_service,
            dashboard_service,
        }
    }
}
