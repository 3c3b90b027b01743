//! PostgreSQL-backed `EventRepository` implementation using Diesel.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::appointment::PaymentStatus;
use crate::domain::event::{Event, EventFilter, EventPatch, EventRegistration, NewEvent};
use crate::domain::ports::{EventRepository, RepositoryError};

use super::diesel_helpers::{map_diesel_error, map_pool_error, parse_stored, usernames_by_id};
use super::models::{EventChangeset, EventRow, NewEventRow, NewRegistrationRow, RegistrationRow};
use super::pool::DbPool;
use super::schema::{event_registrations, events};

/// Diesel-backed implementation of the `EventRepository` port.
#[derive(Clone)]
pub struct DieselEventRepository {
    pool: DbPool,
}

impl DieselEventRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_registration(
    row: RegistrationRow,
    user_name: String,
) -> Result<EventRegistration, RepositoryError> {
    Ok(EventRegistration {
        id: row.id,
        user_id: row.user_id,
        user_name,
        event_id: row.event_id,
        registered_at: row.registered_at,
        payment_status: parse_stored("payment status", &row.payment_status)?,
    })
}

async fn hydrate_rows(
    conn: &mut AsyncPgConnection,
    rows: Vec<EventRow>,
) -> Result<Vec<Event>, RepositoryError> {
    let event_ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();

    let registration_rows: Vec<RegistrationRow> = event_registrations::table
        .filter(event_registrations::event_id.eq_any(&event_ids))
        .order(event_registrations::registered_at.asc())
        .select(RegistrationRow::as_select())
        .load(conn)
        .await
        .map_err(|err| map_diesel_error("event registration", err))?;

    let user_ids: Vec<Uuid> = registration_rows.iter().map(|row| row.user_id).collect();
    let user_names = usernames_by_id(conn, &user_ids).await?;

    let mut registrations_by_event: HashMap<Uuid, Vec<EventRegistration>> = HashMap::new();
    for row in registration_rows {
        let event_id = row.event_id;
        let user_name = user_names.get(&row.user_id).cloned().unwrap_or_default();
        registrations_by_event
            .entry(event_id)
            .or_default()
            .push(row_to_registration(row, user_name)?);
    }

    rows.into_iter()
        .map(|row| {
            let registered_users = registrations_by_event.remove(&row.id).unwrap_or_default();
            let spots_left =
                row.capacity - i32::try_from(registered_users.len()).unwrap_or(i32::MAX);
            Ok(Event {
                id: row.id,
                title: row.title,
                date: row.date,
                time: row.time,
                location: row.location,
                category: parse_stored("category", &row.category)?,
                capacity: row.capacity,
                description: row.description,
                presenter: row.presenter,
                price_cents: row.price_cents,
                image: row.image,
                created_at: row.created_at,
                registered_users,
                spots_left,
            })
        })
        .collect()
}

#[async_trait]
impl EventRepository for DieselEventRepository {
    async fn list(&self, filter: &EventFilter) -> Result<Vec<Event>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = events::table.select(EventRow::as_select()).into_boxed();
        if let Some(category) = filter.category {
            query = query.filter(events::category.eq(category.as_str()));
        }
        if let Some(from) = filter.upcoming_from {
            query = query.filter(events::date.ge(from));
        }
        if filter.free_only {
            query = query.filter(events::price_cents.eq(0));
        }
        if let Some(search) = &filter.search {
            let pattern = format!("%{search}%");
            query = query.filter(
                events::title
                    .ilike(pattern.clone())
                    .or(events::description.ilike(pattern.clone()))
                    .or(events::presenter.ilike(pattern.clone()))
                    .or(events::location.ilike(pattern)),
            );
        }

        let rows: Vec<EventRow> = query
            .order(events::date.asc())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error("event", err))?;
        hydrate_rows(&mut conn, rows).await
    }

    async fn find(&self, id: Uuid) -> Result<Option<Event>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<EventRow> = events::table
            .find(id)
            .select(EventRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error("event", err))?;
        let Some(row) = row else { return Ok(None) };
        Ok(hydrate_rows(&mut conn, vec![row]).await?.into_iter().next())
    }

    async fn create(&self, event: NewEvent) -> Result<Event, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewEventRow {
            id: Uuid::new_v4(),
            title: event.title,
            date: event.date,
            time: event.time,
            location: event.location,
            category: event.category.as_str().to_owned(),
            capacity: event.capacity,
            description: event.description,
            presenter: event.presenter,
            price_cents: event.price_cents,
            image: event.image,
        };

        let row: EventRow = diesel::insert_into(events::table)
            .values(&new_row)
            .returning(EventRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error("event", err))?;
        hydrate_rows(&mut conn, vec![row])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RepositoryError::query("event vanished during create"))
    }

    async fn update(&self, id: Uuid, patch: EventPatch) -> Result<Event, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changeset = EventChangeset {
            title: patch.title,
            date: patch.date,
            time: patch.time,
            location: patch.location,
            category: patch.category.map(|category| category.as_str().to_owned()),
            capacity: patch.capacity,
            description: patch.description,
            presenter: patch.presenter,
            price_cents: patch.price_cents,
            image: patch.image,
        };
        let is_empty = changeset.title.is_none()
            && changeset.date.is_none()
            && changeset.time.is_none()
            && changeset.location.is_none()
            && changeset.category.is_none()
            && changeset.capacity.is_none()
            && changeset.description.is_none()
            && changeset.presenter.is_none()
            && changeset.price_cents.is_none()
            && changeset.image.is_none();

        let row: EventRow = if is_empty {
            events::table
                .find(id)
                .select(EventRow::as_select())
                .first(&mut conn)
                .await
                .map_err(|err| map_diesel_error("event", err))?
        } else {
            diesel::update(events::table.find(id))
                .set(&changeset)
                .returning(EventRow::as_returning())
                .get_result(&mut conn)
                .await
                .map_err(|err| map_diesel_error("event", err))?
        };
        hydrate_rows(&mut conn, vec![row])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RepositoryError::query("event vanished during update"))
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(events::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error("event", err))?;
        if deleted == 0 {
            return Err(RepositoryError::missing("event"));
        }
        Ok(())
    }

    async fn registration_count(&self, event_id: Uuid) -> Result<i64, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        event_registrations::table
            .filter(event_registrations::event_id.eq(event_id))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error("event registration", err))
    }

    async fn find_registration(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<EventRegistration>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<RegistrationRow> = event_registrations::table
            .filter(event_registrations::event_id.eq(event_id))
            .filter(event_registrations::user_id.eq(user_id))
            .select(RegistrationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error("event registration", err))?;
        let Some(row) = row else { return Ok(None) };
        let user_names = usernames_by_id(&mut conn, &[row.user_id]).await?;
        let user_name = user_names.get(&row.user_id).cloned().unwrap_or_default();
        Ok(Some(row_to_registration(row, user_name)?))
    }

    async fn add_registration(
        &self,
        event_id: Uuid,
        user_id: Uuid,
        payment_status: PaymentStatus,
    ) -> Result<EventRegistration, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewRegistrationRow {
            id: Uuid::new_v4(),
            user_id,
            event_id,
            payment_status: payment_status.as_str().to_owned(),
        };

        let row: RegistrationRow = diesel::insert_into(event_registrations::table)
            .values(&new_row)
            .returning(RegistrationRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error("event registration", err))?;
        let user_names = usernames_by_id(&mut conn, &[row.user_id]).await?;
        let user_name = user_names.get(&row.user_id).cloned().unwrap_or_default();
        row_to_registration(row, user_name)
    }

    async fn remove_registration(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(
            event_registrations::table
                .filter(event_registrations::event_id.eq(event_id))
                .filter(event_registrations::user_id.eq(user_id)),
        )
        .execute(&mut conn)
        .await
        .map_err(|err| map_diesel_error("event registration", err))?;
        if deleted == 0 {
            return Err(RepositoryError::missing("event registration"));
        }
        Ok(())
    }

    async fn count_upcoming(&self, from: NaiveDate) -> Result<i64, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        events::table
            .filter(events::date.ge(from))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error("event", err))
    }
}
