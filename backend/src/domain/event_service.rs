//! Event registration rules: uniqueness and capacity.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::Error;
use crate::domain::appointment::PaymentStatus;
use crate::domain::event::EventRegistration;
use crate::domain::ports::EventRepository;

/// Applies registration rules on top of the event store.
#[derive(Clone)]
pub struct EventService {
    events: Arc<dyn EventRepository>,
}

impl EventService {
    /// Build the service over its port.
    pub fn new(events: Arc<dyn EventRepository>) -> Self {
        Self { events }
    }

    /// Register a user for an event.
    ///
    /// Refuses duplicates and full events with a conflict. Free events are
    /// marked paid immediately; priced events start pending.
    pub async fn register(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<EventRegistration, Error> {
        let event = self
            .events
            .find(event_id)
            .await?
            .ok_or_else(|| Error::not_found("event not found"))?;

        if self
            .events
            .find_registration(event_id, user_id)
            .await?
            .is_some()
        {
            return Err(Error::conflict(
                "you are already registered for this event",
            ));
        }

        let taken = self.events.registration_count(event_id).await?;
        if taken >= i64::from(event.capacity) {
            return Err(Error::conflict("this event is already full"));
        }

        let payment_status = if event.price_cents > 0 {
            PaymentStatus::Pending
        } else {
            PaymentStatus::Paid
        };

        Ok(self
            .events
            .add_registration(event_id, user_id, payment_status)
            .await?)
    }

    /// Remove a user's registration, reporting a conflict when none exists.
    pub async fn unregister(&self, event_id: Uuid, user_id: Uuid) -> Result<(), Error> {
        if self.events.find(event_id).await?.is_none() {
            return Err(Error::not_found("event not found"));
        }
        if self
            .events
            .find_registration(event_id, user_id)
            .await?
            .is_none()
        {
            return Err(Error::conflict("you are not registered for this event"));
        }
        self.events.remove_registration(event_id, user_id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::event::NewEvent;
    use crate::domain::event::EventCategory;
    use crate::domain::ports::{EventRepository, UserRepository};
    use crate::domain::user::{NewUser, UserRole};
    use crate::outbound::MemoryStore;
    use chrono::NaiveDate;
    use uuid::Uuid;

    async fn seed_user(store: &MemoryStore, email: &str) -> Uuid {
        UserRepository::create(
            store,
            NewUser {
                username: email.split('@').next().unwrap_or("user").into(),
                email: email.into(),
                phone: None,
                role: UserRole::Client,
                profile_image: None,
                password_hash: "$argon2id$stub".into(),
            },
        )
        .await
        .expect("seed user")
        .id
    }

    async fn seed_event(store: &MemoryStore, capacity: i32, price_cents: i32) -> Uuid {
        EventRepository::create(
            store,
            NewEvent {
                title: "Mindfulness workshop".into(),
                date: NaiveDate::from_ymd_opt(2026, 10, 12).expect("valid date"),
                time: "10 AM - 12 PM".into(),
                location: "Community hall".into(),
                category: EventCategory::Workshop,
                capacity,
                description: "Introductory session".into(),
                presenter: "Dr. Rivers".into(),
                price_cents,
                image: None,
            },
        )
        .await
        .expect("seed event")
        .id
    }

    #[tokio::test]
    async fn free_events_settle_immediately() {
        let store = MemoryStore::new();
        let event_id = seed_event(&store, 10, 0).await;
        let user_id = seed_user(&store, "ada@example.com").await;
        let service = EventService::new(Arc::new(store));

        let registration = service.register(event_id, user_id).await.expect("register");
        assert_eq!(registration.payment_status, PaymentStatus::Paid);
    }

    #[tokio::test]
    async fn priced_events_start_pending() {
        let store = MemoryStore::new();
        let event_id = seed_event(&store, 10, 2500).await;
        let user_id = seed_user(&store, "ada@example.com").await;
        let service = EventService::new(Arc::new(store));

        let registration = service.register(event_id, user_id).await.expect("register");
        assert_eq!(registration.payment_status, PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts() {
        let store = MemoryStore::new();
        let event_id = seed_event(&store, 10, 0).await;
        let user_id = seed_user(&store, "ada@example.com").await;
        let service = EventService::new(Arc::new(store));

        service.register(event_id, user_id).await.expect("register");
        let err = service
            .register(event_id, user_id)
            .await
            .expect_err("duplicate registration");
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn registration_is_refused_at_capacity() {
        let store = MemoryStore::new();
        let event_id = seed_event(&store, 1, 0).await;
        let ada = seed_user(&store, "ada@example.com").await;
        let bob = seed_user(&store, "bob@example.com").await;
        let service = EventService::new(Arc::new(store));

        service.register(event_id, ada).await.expect("register");
        let err = service
            .register(event_id, bob)
            .await
            .expect_err("event is full");
        assert_eq!(err.code(), ErrorCode::Conflict);
        assert_eq!(err.message(), "this event is already full");
    }

    #[tokio::test]
    async fn unregister_without_registration_conflicts() {
        let store = MemoryStore::new();
        let event_id = seed_event(&store, 10, 0).await;
        let user_id = seed_user(&store, "ada@example.com").await;
        let service = EventService::new(Arc::new(store));

        let err = service
            .unregister(event_id, user_id)
            .await
            .expect_err("nothing to remove");
        assert_eq!(err.code(), ErrorCode::Conflict);

        service.register(event_id, user_id).await.expect("register");
        service
            .unregister(event_id, user_id)
            .await
            .expect("unregister");
    }

    #[tokio::test]
    async fn unknown_event_is_not_found() {
        let store = MemoryStore::new();
        let user_id = seed_user(&store, "ada@example.com").await;
        let service = EventService::new(Arc::new(store));

        let err = service
            .register(Uuid::new_v4(), user_id)
            .await
            .expect_err("missing event");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
