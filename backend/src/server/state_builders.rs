//! Wiring of port implementations into the HTTP state.

use std::sync::Arc;

use actix_web::web;
use tracing::warn;

use backend::inbound::http::state::{HttpState, HttpStatePorts};
use backend::outbound::MemoryStore;
use backend::outbound::persistence::{
    DbPool, DieselAppointmentRepository, DieselCategoryRepository, DieselEventRepository,
    DieselMessageRepository, DieselNotificationRepository, DieselProgressRepository,
    DieselReadingListRepository, DieselResourceRepository, DieselReviewRepository,
    DieselStatsRepository, DieselTherapistRepository, DieselUserRepository,
};

use super::ServerConfig;

fn diesel_ports(pool: &DbPool) -> HttpStatePorts {
    HttpStatePorts {
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        therapists: Arc::new(DieselTherapistRepository::new(pool.clone())),
        appointments: Arc::new(DieselAppointmentRepository::new(pool.clone())),
        reviews: Arc::new(DieselReviewRepository::new(pool.clone())),
        resources: Arc::new(DieselResourceRepository::new(pool.clone())),
        events: Arc::new(DieselEventRepository::new(pool.clone())),
        reading_lists: Arc::new(DieselReadingListRepository::new(pool.clone())),
        categories: Arc::new(DieselCategoryRepository::new(pool.clone())),
        notifications: Arc::new(DieselNotificationRepository::new(pool.clone())),
        messages: Arc::new(DieselMessageRepository::new(pool.clone())),
        progress: Arc::new(DieselProgressRepository::new(pool.clone())),
        stats: Arc::new(DieselStatsRepository::new(pool.clone())),
    }
}

fn memory_ports() -> HttpStatePorts {
    let store = MemoryStore::new();
    HttpStatePorts {
        users: Arc::new(store.clone()),
        therapists: Arc::new(store.clone()),
        appointments: Arc::new(store.clone()),
        reviews: Arc::new(store.clone()),
        resources: Arc::new(store.clone()),
        events: Arc::new(store.clone()),
        reading_lists: Arc::new(store.clone()),
        categories: Arc::new(store.clone()),
        notifications: Arc::new(store.clone()),
        messages: Arc::new(store.clone()),
        progress: Arc::new(store.clone()),
        stats: Arc::new(store),
    }
}

/// Build the HTTP state from the configured backing store.
pub(crate) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let ports = match &config.db_pool {
        Some(pool) => diesel_ports(pool),
        None => {
            warn!("no database configured; records are held in memory and lost on restart");
            memory_ports()
        }
    };
    web::Data::new(HttpState::new(ports))
}
