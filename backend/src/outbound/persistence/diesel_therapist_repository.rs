//! PostgreSQL-backed `TherapistRepository` implementation using Diesel.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{RepositoryError, TherapistRepository};
use crate::domain::therapist::{
    NewScheduleSlot, NewTherapist, ScheduleSlot, Therapist, TherapistFilter, TherapistPatch,
};
use crate::domain::user::User;

use super::diesel_helpers::{map_diesel_error, map_pool_error, parse_stored};
use super::models::{NewSlotRow, NewTherapistRow, SlotRow, TherapistChangeset, TherapistRow, UserRow};
use super::pool::DbPool;
use super::schema::{schedule_slots, therapists, users};

/// Diesel-backed implementation of the `TherapistRepository` port.
#[derive(Clone)]
pub struct DieselTherapistRepository {
    pool: DbPool,
}

impl DieselTherapistRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_user(row: UserRow) -> Result<User, RepositoryError> {
    Ok(User {
        id: row.id,
        username: row.username,
        email: row.email,
        phone: row.phone,
        role: parse_stored("role", &row.role)?,
        profile_image: row.profile_image,
        date_joined: row.date_joined,
    })
}

fn row_to_slot(row: SlotRow) -> Result<ScheduleSlot, RepositoryError> {
    Ok(ScheduleSlot {
        id: row.id,
        day: parse_stored("day", &row.day)?,
        time: row
            .time
            .try_into()
            .map_err(|_| RepositoryError::query("invalid stored slot time"))?,
        available: row.available,
    })
}

fn slot_rows(therapist_id: Uuid, slots: Vec<NewScheduleSlot>) -> Vec<NewSlotRow> {
    let mut seen: Vec<(String, String)> = Vec::new();
    let mut rows = Vec::with_capacity(slots.len());
    for slot in slots {
        let key = (slot.day.as_str().to_owned(), slot.time.to_string());
        if seen.contains(&key) {
            continue;
        }
        rows.push(NewSlotRow {
            id: Uuid::new_v4(),
            therapist_id,
            day: key.0.clone(),
            time: key.1.clone(),
            available: slot.available,
        });
        seen.push(key);
    }
    rows
}

fn sort_slots(slots: &mut [ScheduleSlot]) {
    slots.sort_by(|a, b| (a.day, a.time.clone()).cmp(&(b.day, b.time.clone())));
}

async fn hydrate_rows(
    conn: &mut AsyncPgConnection,
    rows: Vec<TherapistRow>,
) -> Result<Vec<Therapist>, RepositoryError> {
    let therapist_ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let user_ids: Vec<Uuid> = rows.iter().map(|row| row.user_id).collect();

    let user_rows: Vec<UserRow> = users::table
        .filter(users::id.eq_any(&user_ids))
        .select(UserRow::as_select())
        .load(conn)
        .await
        .map_err(|err| map_diesel_error("user", err))?;
    let mut users_by_id: HashMap<Uuid, User> = HashMap::with_capacity(user_rows.len());
    for row in user_rows {
        users_by_id.insert(row.id, row_to_user(row)?);
    }

    let slot_rows: Vec<SlotRow> = schedule_slots::table
        .filter(schedule_slots::therapist_id.eq_any(&therapist_ids))
        .select(SlotRow::as_select())
        .load(conn)
        .await
        .map_err(|err| map_diesel_error("schedule slot", err))?;
    let mut slots_by_therapist: HashMap<Uuid, Vec<ScheduleSlot>> = HashMap::new();
    for row in slot_rows {
        let therapist_id = row.therapist_id;
        slots_by_therapist
            .entry(therapist_id)
            .or_default()
            .push(row_to_slot(row)?);
    }

    let mut therapists = Vec::with_capacity(rows.len());
    for row in rows {
        let Some(user) = users_by_id.get(&row.user_id).cloned() else {
            continue;
        };
        let mut time_slots = slots_by_therapist.remove(&row.id).unwrap_or_default();
        sort_slots(&mut time_slots);
        therapists.push(Therapist {
            id: row.id,
            user,
            specialty: row.specialty,
            experience_years: row.experience_years,
            available: row.available,
            price_cents: row.price_cents,
            languages: row.languages,
            specializations: row.specializations,
            education: row.education,
            about: row.about,
            rating: row.rating,
            reviews_count: row.reviews_count,
            time_slots,
        });
    }
    Ok(therapists)
}

fn matches_search(therapist: &Therapist, search: &str) -> bool {
    let needle = search.to_lowercase();
    therapist.user.username.to_lowercase().contains(&needle)
        || therapist.specialty.to_lowercase().contains(&needle)
        || therapist
            .specializations
            .iter()
            .any(|s| s.to_lowercase().contains(&needle))
}

#[async_trait]
impl TherapistRepository for DieselTherapistRepository {
    async fn list(&self, filter: &TherapistFilter) -> Result<Vec<Therapist>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = therapists::table
            .select(TherapistRow::as_select())
            .into_boxed();
        if filter.available_only {
            query = query.filter(therapists::available.eq(true));
        }
        if let Some(specialty) = &filter.specialty {
            query = query.filter(therapists::specialty.ilike(format!("%{specialty}%")));
        }
        if let Some(language) = &filter.language {
            query = query.filter(therapists::languages.contains(vec![language.clone()]));
        }
        if let Some(min) = filter.min_price_cents {
            query = query.filter(therapists::price_cents.ge(min));
        }
        if let Some(max) = filter.max_price_cents {
            query = query.filter(therapists::price_cents.le(max));
        }
        if let Some(min) = filter.min_rating {
            query = query.filter(therapists::rating.ge(min));
        }

        let rows: Vec<TherapistRow> = query
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error("therapist", err))?;
        let mut therapists = hydrate_rows(&mut conn, rows).await?;

        // The search spans the joined user row; apply it after hydration.
        if let Some(search) = &filter.search {
            therapists.retain(|therapist| matches_search(therapist, search));
        }
        therapists.sort_by(|a, b| a.user.username.cmp(&b.user.username));
        Ok(therapists)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Therapist>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<TherapistRow> = therapists::table
            .find(id)
            .select(TherapistRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error("therapist", err))?;
        let Some(row) = row else { return Ok(None) };
        Ok(hydrate_rows(&mut conn, vec![row]).await?.into_iter().next())
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Therapist>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<TherapistRow> = therapists::table
            .filter(therapists::user_id.eq(user_id))
            .select(TherapistRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error("therapist", err))?;
        let Some(row) = row else { return Ok(None) };
        Ok(hydrate_rows(&mut conn, vec![row]).await?.into_iter().next())
    }

    async fn create(&self, therapist: NewTherapist) -> Result<Therapist, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let user_exists: i64 = users::table
            .filter(users::id.eq(therapist.user_id))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error("user", err))?;
        if user_exists == 0 {
            return Err(RepositoryError::missing("user"));
        }

        let id = Uuid::new_v4();
        let new_row = NewTherapistRow {
            id,
            user_id: therapist.user_id,
            specialty: therapist.specialty,
            experience_years: therapist.experience_years,
            available: therapist.available,
            price_cents: therapist.price_cents,
            languages: therapist.languages,
            specializations: therapist.specializations,
            education: therapist.education,
            about: therapist.about,
        };
        let slots = slot_rows(id, therapist.schedule);

        let row: TherapistRow = conn
            .transaction::<TherapistRow, RepositoryError, _>(|conn| {
                async move {
                    let row: TherapistRow = diesel::insert_into(therapists::table)
                        .values(&new_row)
                        .returning(TherapistRow::as_returning())
                        .get_result(conn)
                        .await
                        .map_err(|err| map_diesel_error("therapist profile", err))?;
                    diesel::insert_into(schedule_slots::table)
                        .values(&slots)
                        .execute(conn)
                        .await
                        .map_err(|err| map_diesel_error("schedule slot", err))?;
                    Ok(row)
                }
                .scope_boxed()
            })
            .await?;

        hydrate_rows(&mut conn, vec![row])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RepositoryError::query("therapist user vanished during create"))
    }

    async fn update(&self, id: Uuid, patch: TherapistPatch) -> Result<Therapist, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changeset = TherapistChangeset {
            specialty: patch.specialty,
            experience_years: patch.experience_years,
            available: patch.available,
            price_cents: patch.price_cents,
            languages: patch.languages,
            specializations: patch.specializations,
            education: patch.education,
            about: patch.about,
        };
        let has_base_changes = changeset.specialty.is_some()
            || changeset.experience_years.is_some()
            || changeset.available.is_some()
            || changeset.price_cents.is_some()
            || changeset.languages.is_some()
            || changeset.specializations.is_some()
            || changeset.education.is_some()
            || changeset.about.is_some();
        let schedule = patch.schedule.map(|slots| slot_rows(id, slots));

        let row: TherapistRow = conn
            .transaction::<TherapistRow, RepositoryError, _>(|conn| {
                async move {
                    let row: TherapistRow = if has_base_changes {
                        diesel::update(therapists::table.find(id))
                            .set(&changeset)
                            .returning(TherapistRow::as_returning())
                            .get_result(conn)
                            .await
                            .map_err(|err| map_diesel_error("therapist", err))?
                    } else {
                        therapists::table
                            .find(id)
                            .select(TherapistRow::as_select())
                            .first(conn)
                            .await
                            .map_err(|err| map_diesel_error("therapist", err))?
                    };
                    if let Some(slots) = schedule {
                        diesel::delete(
                            schedule_slots::table.filter(schedule_slots::therapist_id.eq(id)),
                        )
                        .execute(conn)
                        .await
                        .map_err(|err| map_diesel_error("schedule slot", err))?;
                        diesel::insert_into(schedule_slots::table)
                            .values(&slots)
                            .execute(conn)
                            .await
                            .map_err(|err| map_diesel_error("schedule slot", err))?;
                    }
                    Ok(row)
                }
                .scope_boxed()
            })
            .await?;

        hydrate_rows(&mut conn, vec![row])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RepositoryError::query("therapist user vanished during update"))
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(therapists::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error("therapist", err))?;
        if deleted == 0 {
            return Err(RepositoryError::missing("therapist"));
        }
        Ok(())
    }

    async fn replace_schedule(
        &self,
        id: Uuid,
        slots: Vec<NewScheduleSlot>,
    ) -> Result<Vec<ScheduleSlot>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let exists: i64 = therapists::table
            .filter(therapists::id.eq(id))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error("therapist", err))?;
        if exists == 0 {
            return Err(RepositoryError::missing("therapist"));
        }

        let rows = slot_rows(id, slots);
        let inserted: Vec<SlotRow> = conn
            .transaction::<Vec<SlotRow>, RepositoryError, _>(|conn| {
                async move {
                    diesel::delete(
                        schedule_slots::table.filter(schedule_slots::therapist_id.eq(id)),
                    )
                    .execute(conn)
                    .await
                    .map_err(|err| map_diesel_error("schedule slot", err))?;
                    diesel::insert_into(schedule_slots::table)
                        .values(&rows)
                        .returning(SlotRow::as_returning())
                        .get_results(conn)
                        .await
                        .map_err(|err| map_diesel_error("schedule slot", err))
                }
                .scope_boxed()
            })
            .await?;

        let mut replaced = inserted
            .into_iter()
            .map(row_to_slot)
            .collect::<Result<Vec<_>, _>>()?;
        sort_slots(&mut replaced);
        Ok(replaced)
    }

    async fn set_rating(&self, id: Uuid, rating: f64, count: i32) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = diesel::update(therapists::table.find(id))
            .set((
                therapists::rating.eq(rating),
                therapists::reviews_count.eq(count),
            ))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error("therapist", err))?;
        if updated == 0 {
            return Err(RepositoryError::missing("therapist"));
        }
        Ok(())
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        therapists::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error("therapist", err))
    }
}
